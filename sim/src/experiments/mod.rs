pub mod density;
pub mod dp;
pub mod k_anonymity;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Experiment {
    Density,
    KAnonymity,
    Dp,
    All,
}

impl Experiment {
    pub fn includes(self, other: Experiment) -> bool {
        self == Experiment::All || self == other
    }
}
