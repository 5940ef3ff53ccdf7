use thiserror::Error;

use crate::{NodeId, UserId};

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} is not part of the graph")]
    UnknownNode(NodeId),

    #[error("user {0} is not registered")]
    UnknownUser(UserId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("edge {0} -- {0} would be a self-loop")]
    SelfLoop(NodeId),

    #[error("cannot place users on a graph without nodes")]
    EmptyGraph,

    #[error("probability must lie in [0, 1]")]
    InvalidProbability,
}
