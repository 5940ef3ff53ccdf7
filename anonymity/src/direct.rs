use std::collections::{BTreeSet, HashSet, VecDeque};

use city_graph::{Region, SpatialGraph, UserId, UserRegistry};
use geo::Centroid;
use geo_types::Point;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{AnonymityError, Shortfall};

/// Nodes and users collected while searching for `k` distinct users around a query user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KAnonymousRegion {
    pub region: Region,
    /// Distinct users found on visited nodes, ascending, query user included.
    pub users: Vec<UserId>,
}

/// What gets released for a query: the region's centroid, the region, and its users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disclosure {
    pub location: Point<f64>,
    pub region: Region,
    pub users: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnonymizedLocation {
    /// The region covers at least `k` distinct users.
    Anonymous(Disclosure),
    /// The query user's component holds fewer than `k` users. The region is the first `k`
    /// nodes of the graph and carries no anonymity guarantee whatsoever.
    Fallback {
        disclosure: Disclosure,
        shortfall: Shortfall,
    },
}

impl AnonymizedLocation {
    pub fn disclosure(&self) -> &Disclosure {
        match self {
            AnonymizedLocation::Anonymous(disclosure) => disclosure,
            AnonymizedLocation::Fallback { disclosure, .. } => disclosure,
        }
    }

    pub fn shortfall(&self) -> Option<Shortfall> {
        match self {
            AnonymizedLocation::Anonymous(_) => None,
            AnonymizedLocation::Fallback { shortfall, .. } => Some(*shortfall),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, AnonymizedLocation::Anonymous(_))
    }
}

/// k-anonymity over individual users, with a fixed `k`.
pub struct KAnonymityEngine<'a> {
    graph: &'a SpatialGraph,
    users: &'a UserRegistry,
    k: usize,
}

impl<'a> KAnonymityEngine<'a> {
    pub const DEFAULT_K: usize = 3;

    pub fn new(
        graph: &'a SpatialGraph,
        users: &'a UserRegistry,
        k: usize,
    ) -> Result<Self, AnonymityError> {
        if k == 0 {
            return Err(AnonymityError::InvalidK);
        }
        Ok(Self { graph, users, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Breadth-first search from the query user's node, collecting users node by node.
    ///
    /// Neighbours of a visited node join both the frontier and the region, but only while
    /// fewer than `k` users have been seen. The search ends at `k` users or an empty frontier.
    pub fn find_k_anonymous_region(
        &self,
        query_user: UserId,
    ) -> Result<KAnonymousRegion, AnonymityError> {
        let seed = self.users.node_of(query_user)?;
        self.graph.node(seed)?;

        let mut visited = HashSet::new();
        let mut frontier = VecDeque::from([seed]);
        let mut region = Region::new(seed);
        let mut found = BTreeSet::from([query_user]);

        while found.len() < self.k {
            let Some(current) = frontier.pop_front() else {
                break;
            };
            if !visited.insert(current) {
                continue;
            }
            found.extend(self.users.users_at(self.graph, current)?);
            if found.len() >= self.k {
                break;
            }
            for neigh in self.graph.neighbors(current)? {
                if !visited.contains(&neigh) {
                    frontier.push_back(neigh);
                    region.insert(neigh);
                }
            }
        }

        debug!(
            query_user,
            seed,
            size = region.len(),
            users = found.len(),
            "k-anonymous region search finished"
        );
        Ok(KAnonymousRegion {
            region,
            users: found.into_iter().collect(),
        })
    }

    /// Generalizes the query user's location to the centroid of their k-anonymous region.
    pub fn anonymized_location(
        &self,
        query_user: UserId,
    ) -> Result<AnonymizedLocation, AnonymityError> {
        let KAnonymousRegion { region, users } = self.find_k_anonymous_region(query_user)?;

        if let Some(shortfall) = Shortfall::check(users.len() as u64, self.k as u64) {
            warn!(query_user, k = self.k, %shortfall, "falling back to an arbitrary region");
            let region = self.fallback_region().ok_or(AnonymityError::EmptyRegion)?;
            let location = self.centroid(&region)?;
            return Ok(AnonymizedLocation::Fallback {
                disclosure: Disclosure {
                    location,
                    region,
                    users,
                },
                shortfall,
            });
        }

        let location = self.centroid(&region)?;
        Ok(AnonymizedLocation::Anonymous(Disclosure {
            location,
            region,
            users,
        }))
    }

    /// First `k` nodes by id.
    fn fallback_region(&self) -> Option<Region> {
        let mut ids = self.graph.node_ids().take(self.k);
        let mut region = Region::new(ids.next()?);
        region.extend(ids);
        Some(region)
    }

    fn centroid(&self, region: &Region) -> Result<Point<f64>, AnonymityError> {
        region
            .positions(self.graph)?
            .centroid()
            .ok_or(AnonymityError::EmptyRegion)
    }
}

#[cfg(test)]
mod tests {
    use city_graph::{grid, Edge, EdgeKind, Node};
    use geo_types::Point;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn place(graph: &SpatialGraph, users: &mut UserRegistry, user: UserId, node: u64) {
        let position = graph.position(node).expect("grid node");
        users
            .place(graph, user, node, position)
            .expect("grid node");
    }

    #[test]
    fn k_of_one_is_the_query_node() {
        let graph = grid(4).expect("grid construction");
        let mut users = UserRegistry::new();
        place(&graph, &mut users, 0, 5);
        let engine = KAnonymityEngine::new(&graph, &users, 1).expect("k > 0");
        let found = engine.find_k_anonymous_region(0).expect("user 0 exists");
        assert_eq!(found.region.iter().collect::<Vec<_>>(), vec![5]);
        assert_eq!(found.users, vec![0]);
    }

    #[test]
    fn grows_until_k_distinct_users() {
        let graph = grid(4).expect("grid construction");
        let mut users = UserRegistry::new();
        place(&graph, &mut users, 0, 0);
        place(&graph, &mut users, 1, 1);
        place(&graph, &mut users, 2, 2);
        let engine = KAnonymityEngine::new(&graph, &users, 3).expect("k > 0");
        let found = engine.find_k_anonymous_region(0).expect("user 0 exists");
        assert_eq!(found.users, vec![0, 1, 2]);
        assert!(found.region.contains(0));
        assert!(found.region.contains(2));

        let location = engine.anonymized_location(0).expect("user 0 exists");
        assert!(location.is_anonymous());
        let disclosure = location.disclosure();
        let n = disclosure.region.len() as f64;
        let (sx, sy) = disclosure
            .region
            .iter()
            .map(|id| graph.position(id).expect("grid node").x_y())
            .fold((0., 0.), |(ax, ay), (x, y)| (ax + x, ay + y));
        assert!((disclosure.location.x() - sx / n).abs() < 1e-9);
        assert!((disclosure.location.y() - sy / n).abs() < 1e-9);
    }

    #[test]
    fn co_located_users_satisfy_k_without_growth() {
        let graph = grid(3).expect("grid construction");
        let mut users = UserRegistry::new();
        for user in 0..3 {
            place(&graph, &mut users, user, 4);
        }
        let engine = KAnonymityEngine::new(&graph, &users, 3).expect("k > 0");
        let location = engine.anonymized_location(1).expect("user 1 exists");
        let disclosure = location.disclosure();
        assert_eq!(disclosure.region.iter().collect::<Vec<_>>(), vec![4]);
        assert_eq!(disclosure.location, Point::new(1., 1.));
    }

    #[test]
    fn isolated_user_gets_flagged_fallback() {
        let mut graph = SpatialGraph::new();
        for id in 0..5 {
            graph
                .add_node(Node::new(id, id as f64, 0.))
                .expect("fresh node");
        }
        graph
            .add_edge(Edge::new(0, 1, EdgeKind::Street))
            .expect("known nodes");
        let mut users = UserRegistry::new();
        place(&graph, &mut users, 10, 4);
        place(&graph, &mut users, 11, 0);
        place(&graph, &mut users, 12, 1);

        let engine = KAnonymityEngine::new(&graph, &users, 2).expect("k > 0");
        let location = engine.anonymized_location(10).expect("user 10 exists");
        assert!(!location.is_anonymous());
        assert_eq!(
            location.shortfall(),
            Some(Shortfall {
                found: 1,
                required: 2
            })
        );
        let disclosure = location.disclosure();
        assert_eq!(disclosure.region.iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(disclosure.location, Point::new(0.5, 0.));
        assert_eq!(disclosure.users, vec![10]);

        assert!(engine.anonymized_location(11).expect("user 11").is_anonymous());
    }

    #[test]
    fn invalid_inputs() {
        let graph = grid(2).expect("grid construction");
        let users = UserRegistry::new();
        assert!(matches!(
            KAnonymityEngine::new(&graph, &users, 0),
            Err(AnonymityError::InvalidK)
        ));
        let engine = KAnonymityEngine::new(&graph, &users, 2).expect("k > 0");
        assert!(matches!(
            engine.find_k_anonymous_region(9),
            Err(AnonymityError::Graph(_))
        ));
    }

    proptest! {
        #[test]
        fn region_always_contains_query_node(seed in 0u64..1_000, k in 1usize..8) {
            let graph = grid(6).expect("grid construction");
            let mut rng = StdRng::seed_from_u64(seed);
            let users = UserRegistry::scatter(&graph, 12, &mut rng).expect("non-empty graph");
            let engine = KAnonymityEngine::new(&graph, &users, k).expect("k > 0");
            for (user, placement) in users.iter() {
                let found = engine.find_k_anonymous_region(user).expect("registered user");
                prop_assert!(found.region.contains(placement.node));
                prop_assert!(found.users.contains(&user));
                prop_assert!(found.users.len() >= k.min(users.len()));
            }
        }
    }
}
