pub mod error;
pub use error::*;

pub mod graph;
pub use graph::*;

pub mod index;
pub use index::*;

pub mod population;
pub use population::*;

pub mod region;
pub use region::*;

pub mod users;
pub use users::*;

#[inline]
pub(crate) fn default<T: Default>() -> T {
    T::default()
}

pub type NodeId = u64;
pub type UserId = u64;
