mod node_index;
pub use node_index::*;
