//! Spatial k-anonymity over a [`city_graph::SpatialGraph`].
//!
//! Two engines live here: [`DensityAwareEngine`] grows a region until the aggregate head-count
//! of a [`city_graph::Population`] reaches a density-derived target, and [`KAnonymityEngine`]
//! grows one until it covers `k` distinct users of a [`city_graph::UserRegistry`].
//! Neither guarantee holds when the reachable graph runs out first; both engines report that
//! as a [`Shortfall`] instead of pretending success.

pub mod density;
pub use density::*;
pub mod direct;
pub use direct::*;
pub mod error;
pub use error::*;
pub mod shortfall;
pub use shortfall::*;
