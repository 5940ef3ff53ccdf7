use std::collections::BTreeMap;

use geo_types::Point;
use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::{GraphError, NodeId};

#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    #[default]
    Street = 0,
    Avenue = 1,
    Diagonal = 2,
}

impl From<u8> for EdgeKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Street,
            1 => Self::Avenue,
            _ => Self::Diagonal,
        }
    }
}

impl From<EdgeKind> for u8 {
    fn from(value: EdgeKind) -> Self {
        value as Self
    }
}

/// An intersection in the city. Immutable once inserted into a [`SpatialGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point<f64>,
}

impl Node {
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

/// Undirected, simple road network. Nodes carry positions, edges carry a cosmetic [`EdgeKind`].
///
/// Components do not need to be connected; every traversal in the workspace stays inside
/// the component of its seed.
#[derive(Debug, Clone, Default)]
pub struct SpatialGraph {
    nodes: BTreeMap<NodeId, Node>,
    edges: UnGraphMap<NodeId, EdgeKind>,
}

impl SpatialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: UnGraphMap::with_capacity(nodes, edges),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn position(&self, id: NodeId) -> Result<Point<f64>, GraphError> {
        self.node(id).map(|n| n.position)
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Neighbours of `id`, sorted by id so traversals are reproducible.
    pub fn neighbors(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        if !self.contains(id) {
            return Err(GraphError::UnknownNode(id));
        }
        Ok(self.edges.neighbors(id).sorted_unstable().collect())
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<EdgeKind> {
        self.edges.edge_weight(a, b).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges
            .all_edges()
            .map(|(source, target, kind)| Edge::new(source, target, *kind))
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.contains(node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id, node);
        self.edges.add_node(node.id);
        Ok(node.id)
    }

    /// Adds an undirected edge. Re-adding an existing edge only replaces its kind.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(NodeId, NodeId), GraphError> {
        let Edge {
            source,
            target,
            kind,
        } = edge;
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        for id in [source, target] {
            if !self.contains(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        self.edges.add_edge(source, target, kind);
        Ok((source, target))
    }
}
