pub mod builder;
pub use builder::*;
pub mod spatial_graph;
pub use spatial_graph::*;
