use city_graph::GraphError;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnonymityError {
    #[error("k must be at least 1")]
    InvalidK,

    #[error("invalid density policy: {0}")]
    InvalidPolicy(&'static str),

    #[error("cannot locate a region without nodes")]
    EmptyRegion,

    #[error(transparent)]
    Graph(#[from] GraphError),
}
