use rand::Rng;

use super::*;
use crate::{GraphError, NodeId};

/// `size`x`size` 4-neighbour grid. Node `row * size + col` sits at `(col, row)`;
/// horizontal edges are streets, vertical edges are avenues.
pub fn grid(size: u32) -> Result<SpatialGraph, GraphError> {
    let n = size as usize;
    let mut graph = SpatialGraph::with_capacity(n * n, 2 * n * n.saturating_sub(1));
    let id = |row: u32, col: u32| NodeId::from(row) * NodeId::from(size) + NodeId::from(col);

    for row in 0..size {
        for col in 0..size {
            graph.add_node(Node::new(id(row, col), col.into(), row.into()))?;
        }
    }
    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                graph.add_edge(Edge::new(id(row, col), id(row, col + 1), EdgeKind::Street))?;
            }
            if row + 1 < size {
                graph.add_edge(Edge::new(id(row, col), id(row + 1, col), EdgeKind::Avenue))?;
            }
        }
    }
    Ok(graph)
}

/// [`grid`] plus shortcut diagonals. Every cell whose row and column are both even gets an
/// edge to its lower-right neighbour with probability `probability`, which must lie in `[0, 1]`.
pub fn grid_with_diagonals<R: Rng + ?Sized>(
    size: u32,
    probability: f64,
    rng: &mut R,
) -> Result<SpatialGraph, GraphError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(GraphError::InvalidProbability);
    }
    let mut graph = grid(size)?;
    let id = |row: u32, col: u32| NodeId::from(row) * NodeId::from(size) + NodeId::from(col);

    for row in (0..size.saturating_sub(1)).step_by(2) {
        for col in (0..size.saturating_sub(1)).step_by(2) {
            if rng.random_bool(probability) {
                graph.add_edge(Edge::new(
                    id(row, col),
                    id(row + 1, col + 1),
                    EdgeKind::Diagonal,
                ))?;
            }
        }
    }
    Ok(graph)
}
