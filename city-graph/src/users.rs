use std::collections::{BTreeMap, BTreeSet, HashMap};

use geo_types::Point;
use rand::{seq::IndexedRandom, Rng};
use serde::Serialize;
use tracing::trace;

use crate::{default, GraphError, NodeId, SpatialGraph, UserId};

/// Maximum offset, per axis, between a user's display position and their node.
pub const JITTER: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub node: NodeId,
    pub position: Point<f64>,
}

/// Individual users and the node each one currently stands on.
///
/// A reverse node -> users index is kept in sync so [`UserRegistry::users_at`] is a single lookup.
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    placements: BTreeMap<UserId, Placement>,
    by_node: HashMap<NodeId, BTreeSet<UserId>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        default()
    }

    /// Users `0..count`, each on a uniformly chosen node with a jittered position.
    pub fn scatter<R: Rng + ?Sized>(
        graph: &SpatialGraph,
        count: u64,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        let mut registry = Self::new();
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        for user in 0..count {
            let node = *nodes.choose(rng).ok_or(GraphError::EmptyGraph)?;
            registry.place_jittered(graph, user, node, rng)?;
        }
        Ok(registry)
    }

    /// Puts `user` on `node` at an exact display position. Registers or relocates the user.
    pub fn place(
        &mut self,
        graph: &SpatialGraph,
        user: UserId,
        node: NodeId,
        position: Point<f64>,
    ) -> Result<(), GraphError> {
        if !graph.contains(node) {
            return Err(GraphError::UnknownNode(node));
        }
        if let Some(previous) = self.placements.insert(user, Placement { node, position }) {
            self.detach(user, previous.node);
        }
        self.by_node.entry(node).or_default().insert(user);
        Ok(())
    }

    pub fn place_jittered<R: Rng + ?Sized>(
        &mut self,
        graph: &SpatialGraph,
        user: UserId,
        node: NodeId,
        rng: &mut R,
    ) -> Result<(), GraphError> {
        let (x, y) = graph.position(node)?.x_y();
        let position = Point::new(
            x + rng.random_range(-JITTER..=JITTER),
            y + rng.random_range(-JITTER..=JITTER),
        );
        self.place(graph, user, node, position)
    }

    /// Relocates an already registered user and draws a fresh display position.
    pub fn move_user<R: Rng + ?Sized>(
        &mut self,
        graph: &SpatialGraph,
        user: UserId,
        node: NodeId,
        rng: &mut R,
    ) -> Result<(), GraphError> {
        let from = self.node_of(user)?;
        self.place_jittered(graph, user, node, rng)?;
        trace!(user, from, to = node, "user moved");
        Ok(())
    }

    fn detach(&mut self, user: UserId, node: NodeId) {
        if let Some(users) = self.by_node.get_mut(&node) {
            users.remove(&user);
            if users.is_empty() {
                self.by_node.remove(&node);
            }
        }
    }

    pub fn placement(&self, user: UserId) -> Result<&Placement, GraphError> {
        self.placements
            .get(&user)
            .ok_or(GraphError::UnknownUser(user))
    }

    pub fn node_of(&self, user: UserId) -> Result<NodeId, GraphError> {
        self.placement(user).map(|p| p.node)
    }

    pub fn position_of(&self, user: UserId) -> Result<Point<f64>, GraphError> {
        self.placement(user).map(|p| p.position)
    }

    /// Users currently on `node`, ascending. Fails for nodes `graph` does not know.
    pub fn users_at(
        &self,
        graph: &SpatialGraph,
        node: NodeId,
    ) -> Result<impl Iterator<Item = UserId> + '_, GraphError> {
        if !graph.contains(node) {
            return Err(GraphError::UnknownNode(node));
        }
        Ok(self.by_node.get(&node).into_iter().flatten().copied())
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserId, &Placement)> + '_ {
        self.placements.iter().map(|(&id, p)| (id, p))
    }
}
