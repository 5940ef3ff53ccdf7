//! Coordinate-level differential privacy with the Laplace mechanism.
//!
//! Each coordinate receives independent `Laplace(0, sensitivity / epsilon)` noise. A smaller
//! epsilon (privacy budget) means a wider distribution and stronger privacy; a larger epsilon
//! means less noise and weaker privacy.

pub mod laplace;
pub use laplace::*;
pub mod privacy;
pub use privacy::*;

use city_graph::{NodeId, NodeIndex};
use derive_more::Into;
use geo_types::Point;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Distribution;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_EPSILONS: [f64; 5] = [0.1, 0.5, 1.0, 2.0, 5.0];
/// L1 sensitivity of a single coordinate.
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationObfuscationError {
    #[error("epsilon must be positive, got {0}")]
    InvalidEpsilon(f64),
    #[error("sensitivity must not be negative, got {0}")]
    InvalidSensitivity(f64),
    #[error("laplace scale must not be negative, got {0}")]
    InvalidScale(f64),
    #[error("at least one epsilon value is required")]
    NoEpsilonValues,
    #[error("cannot snap to a network without nodes")]
    NoNodes,
}

/// A validated privacy budget, always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Into)]
pub struct Epsilon(f64);

impl Epsilon {
    pub fn new(value: f64) -> Result<Self, LocationObfuscationError> {
        if value.is_nan() || value <= 0.0 {
            return Err(LocationObfuscationError::InvalidEpsilon(value));
        }
        Ok(Epsilon(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn privacy_level(self) -> PrivacyLevel {
        PrivacyLevel::classify(self.0)
    }
}

impl TryFrom<f64> for Epsilon {
    type Error = LocationObfuscationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Epsilon::new(value)
    }
}

/// A noised location together with the network node it snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapped {
    pub location: Point<f64>,
    pub node: NodeId,
}

/// Every location obfuscated under one epsilon of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpsilonRun {
    pub epsilon: Epsilon,
    pub level: PrivacyLevel,
    pub noisy: Vec<Point<f64>>,
}

/// Laplace-mechanism location obfuscator.
///
/// The noise source is injected, so a seeded `R` makes every draw reproducible.
#[derive(Debug, Clone)]
pub struct Obfuscator<R = StdRng> {
    epsilons: Vec<Epsilon>,
    sensitivity: f64,
    rng: R,
}

impl Obfuscator<StdRng> {
    pub fn seeded(
        epsilons: impl IntoIterator<Item = f64>,
        sensitivity: f64,
        seed: u64,
    ) -> Result<Self, LocationObfuscationError> {
        Self::new(epsilons, sensitivity, StdRng::seed_from_u64(seed))
    }

    pub fn with_defaults(seed: u64) -> Result<Self, LocationObfuscationError> {
        Self::seeded(DEFAULT_EPSILONS, DEFAULT_SENSITIVITY, seed)
    }
}

impl<R: Rng> Obfuscator<R> {
    pub fn new(
        epsilons: impl IntoIterator<Item = f64>,
        sensitivity: f64,
        rng: R,
    ) -> Result<Self, LocationObfuscationError> {
        if sensitivity.is_nan() || sensitivity < 0.0 {
            return Err(LocationObfuscationError::InvalidSensitivity(sensitivity));
        }
        let epsilons = epsilons
            .into_iter()
            .map(Epsilon::new)
            .collect::<Result<Vec<_>, _>>()?;
        if epsilons.is_empty() {
            return Err(LocationObfuscationError::NoEpsilonValues);
        }
        Ok(Self {
            epsilons,
            sensitivity,
            rng,
        })
    }

    pub fn epsilons(&self) -> &[Epsilon] {
        &self.epsilons
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    fn distribution(&self, epsilon: f64) -> Result<Laplace, LocationObfuscationError> {
        let epsilon = Epsilon::new(epsilon)?;
        Laplace::new(self.sensitivity / epsilon.get())
    }

    /// `value` plus one `Laplace(0, sensitivity / epsilon)` draw.
    pub fn add_noise(&mut self, value: f64, epsilon: f64) -> Result<f64, LocationObfuscationError> {
        let laplace = self.distribution(epsilon)?;
        Ok(value + laplace.sample(&mut self.rng))
    }

    /// Noises x and y independently. The result is not clamped to any bounds.
    pub fn obfuscate(
        &mut self,
        location: Point<f64>,
        epsilon: f64,
    ) -> Result<Point<f64>, LocationObfuscationError> {
        let laplace = self.distribution(epsilon)?;
        Ok(noised(location, &laplace, &mut self.rng))
    }

    /// Obfuscates every location under the same epsilon, keeping order and length.
    pub fn batch_obfuscate<I>(
        &mut self,
        locations: I,
        epsilon: f64,
    ) -> Result<Vec<Point<f64>>, LocationObfuscationError>
    where
        I: IntoIterator<Item = Point<f64>>,
    {
        let laplace = self.distribution(epsilon)?;
        Ok(locations
            .into_iter()
            .map(|p| noised(p, &laplace, &mut self.rng))
            .collect())
    }

    /// Obfuscates `location`, then snaps the noisy point to the closest node of `index`.
    pub fn obfuscate_to_node(
        &mut self,
        location: Point<f64>,
        epsilon: f64,
        index: &NodeIndex,
    ) -> Result<Snapped, LocationObfuscationError> {
        if index.is_empty() {
            return Err(LocationObfuscationError::NoNodes);
        }
        let location = self.obfuscate(location, epsilon)?;
        let node = index
            .nearest(location)
            .ok_or(LocationObfuscationError::NoNodes)?;
        Ok(Snapped { location, node })
    }

    /// Runs [`Obfuscator::batch_obfuscate`] for every configured epsilon in parallel.
    ///
    /// Run `i` draws from its own `StdRng` seeded with `seed + i`, so results do not depend on
    /// scheduling. Output follows the configured epsilon order.
    pub fn sweep(
        &self,
        locations: &[Point<f64>],
        seed: u64,
    ) -> Result<Vec<EpsilonRun>, LocationObfuscationError> {
        let sensitivity = self.sensitivity;
        self.epsilons
            .par_iter()
            .enumerate()
            .map(|(i, &epsilon)| -> Result<EpsilonRun, LocationObfuscationError> {
                let mut run = Obfuscator::new(
                    [epsilon.get()],
                    sensitivity,
                    StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                )?;
                let noisy = run.batch_obfuscate(locations.iter().copied(), epsilon.get())?;
                debug!(epsilon = epsilon.get(), points = noisy.len(), "sweep run finished");
                Ok(EpsilonRun {
                    epsilon,
                    level: epsilon.privacy_level(),
                    noisy,
                })
            })
            .collect()
    }
}

fn noised<R: Rng + ?Sized>(location: Point<f64>, laplace: &Laplace, rng: &mut R) -> Point<f64> {
    let (x, y) = location.x_y();
    Point::new(x + laplace.sample(rng), y + laplace.sample(rng))
}
