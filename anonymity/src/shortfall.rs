use derive_more::Display;
use serde::Serialize;

/// Region growth ran out of reachable nodes before meeting its target.
///
/// Not an error: callers decide whether to skip, log or abort.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
#[display("found {found} of the {required} required")]
pub struct Shortfall {
    pub found: u64,
    pub required: u64,
}

impl Shortfall {
    /// `None` when `found` already meets `required`.
    pub fn check(found: u64, required: u64) -> Option<Self> {
        (found < required).then_some(Self { found, required })
    }

    pub fn missing(&self) -> u64 {
        self.required - self.found
    }
}
