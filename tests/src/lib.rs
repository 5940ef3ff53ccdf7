#[cfg(test)]
mod tests {
    use analyzer::*;
    use anonymity::*;
    use city_graph::*;
    use geo_types::Point;
    use location_obfuscation::*;
    use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

    fn users_one_per_node(graph: &SpatialGraph, count: u64, rng: &mut StdRng) -> UserRegistry {
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        let mut users = UserRegistry::new();
        for (user, node) in nodes.choose_multiple(rng, count as usize).enumerate() {
            users
                .place_jittered(graph, user as UserId, *node, rng)
                .expect("grid node");
        }
        users
    }

    #[test]
    fn corner_mass_round_trip() {
        let graph = grid(5).expect("grid construction");
        let mut population = Population::empty(&graph);
        population.set(0, 30).expect("corner exists");
        let engine = DensityAwareEngine::new(&graph, &population, DensityPolicy::default())
            .expect("default policy");

        let density = engine.local_density(0, 1).expect("corner exists");
        assert_eq!(density, 30);
        assert_eq!(engine.classify(density), DensityClass::Dense);
        let k = engine.select_k(density);
        assert_eq!(k, 2);

        let expansion = engine.expand_region(0, k).expect("corner exists");
        assert_eq!(expansion.region.len(), 1);
        assert!(expansion.region.contains(0));
        assert!(expansion.is_satisfied());
        assert_eq!(region_extent(&expansion.region, &graph), Ok(0.0));

        // the far corner sees nobody nearby, asks for k = 10, and must walk back to node 0
        let report = engine.anonymize(24).expect("corner exists");
        assert_eq!(report.class, DensityClass::Sparse);
        assert!(report.expansion.region.contains(0));
        assert!(report.expansion.region.contains(24));
        assert!(report.expansion.is_satisfied());
    }

    #[test]
    fn sparse_users_force_region_growth() {
        let graph = grid(8).expect("grid construction");
        let mut rng = StdRng::seed_from_u64(2024);
        let users = users_one_per_node(&graph, 20, &mut rng);
        let engine = KAnonymityEngine::new(&graph, &users, 3).expect("k > 0");

        let mut grown = 0;
        for (user, placement) in users.iter() {
            assert_eq!(
                users
                    .users_at(&graph, placement.node)
                    .expect("placed on a known node")
                    .count(),
                1
            );
            let found = engine.find_k_anonymous_region(user).expect("registered user");
            assert!(found.region.contains(placement.node));
            assert!(found.users.len() >= engine.k(), "graph is connected with 20 users");
            if found.region.len() > 1 {
                grown += 1;
            }

            let location = engine.anonymized_location(user).expect("registered user");
            assert!(location.is_anonymous());
            let error = location_error(placement.position, location.disclosure().location);
            assert!(error.is_finite());
        }
        // one user per node means nobody can satisfy k = 3 on their own node
        assert_eq!(grown, 20);
    }

    #[test]
    fn mobility_changes_the_disclosed_region() {
        let graph = grid(6).expect("grid construction");
        let mut rng = StdRng::seed_from_u64(5);
        let mut users = UserRegistry::new();
        for (user, node) in [(0, 0), (1, 1), (2, 35)] {
            users
                .place_jittered(&graph, user, node, &mut rng)
                .expect("grid node");
        }

        let before = KAnonymityEngine::new(&graph, &users, 2)
            .expect("k > 0")
            .anonymized_location(2)
            .expect("registered user");
        assert!(before.is_anonymous());
        let spread_before = before.disclosure().region.len();

        users.move_user(&graph, 1, 34, &mut rng).expect("valid move");
        let after = KAnonymityEngine::new(&graph, &users, 2)
            .expect("k > 0")
            .anonymized_location(2)
            .expect("registered user");
        assert!(after.disclosure().users.contains(&1));
        assert!(after.disclosure().region.len() < spread_before);
    }

    #[test]
    fn obfuscation_pipeline_feeds_analyzer() {
        let mut rng = StdRng::seed_from_u64(77);
        let graph = grid(10).expect("grid construction");
        let users = UserRegistry::scatter(&graph, 40, &mut rng).expect("non-empty graph");
        let originals: Vec<Point<f64>> = users.iter().map(|(_, p)| p.position).collect();

        let mut obfuscator = Obfuscator::with_defaults(77).expect("defaults are valid");
        let mut previous_mean = f64::INFINITY;
        for epsilon in obfuscator.epsilons().to_vec() {
            let noisy = obfuscator
                .batch_obfuscate(originals.iter().copied(), epsilon.get())
                .expect("valid epsilon");
            assert_eq!(noisy.len(), originals.len());
            let loss = UtilityLoss::from_errors(&location_errors(&originals, &noisy));
            assert!(!loss.is_degenerate());
            assert!(loss.min_error <= loss.median_error && loss.median_error <= loss.max_error);
            assert!(loss.mean_error < previous_mean * 1.5);
            previous_mean = loss.mean_error;
        }

        let index = NodeIndex::from_graph(&graph);
        let snapped = obfuscator
            .obfuscate_to_node(originals[0], 5.0, &index)
            .expect("non-empty index");
        assert!(graph.contains(snapped.node));
    }

    #[test]
    fn failures_are_distinguishable() {
        let graph = grid(3).expect("grid construction");
        let users = UserRegistry::new();
        let engine = KAnonymityEngine::new(&graph, &users, 2).expect("k > 0");
        assert_eq!(
            engine.find_k_anonymous_region(4),
            Err(AnonymityError::Graph(GraphError::UnknownUser(4)))
        );

        let population = Population::empty(&graph);
        let density = DensityAwareEngine::new(&graph, &population, DensityPolicy::default())
            .expect("default policy");
        assert_eq!(
            density.local_density(9, 1),
            Err(AnonymityError::Graph(GraphError::UnknownNode(9)))
        );
        assert_eq!(
            Obfuscator::with_defaults(0)
                .expect("defaults are valid")
                .add_noise(1.0, -1.0),
            Err(LocationObfuscationError::InvalidEpsilon(-1.0))
        );
        assert!(UtilityLoss::from_errors(&[]).is_degenerate());
    }
}
