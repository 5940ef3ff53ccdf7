use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::LocationObfuscationError;

/// Zero-centred Laplace distribution with scale `b`.
///
/// Sampled as the difference of two `Exp(1 / b)` draws.
#[derive(Debug, Clone, Copy)]
pub struct Laplace {
    scale: f64,
    exp: Option<Exp<f64>>,
}

impl Laplace {
    pub fn new(scale: f64) -> Result<Self, LocationObfuscationError> {
        if scale.is_nan() || scale < 0.0 {
            return Err(LocationObfuscationError::InvalidScale(scale));
        }
        if scale == 0.0 {
            return Ok(Self { scale, exp: None });
        }
        let exp =
            Exp::new(1.0 / scale).map_err(|_| LocationObfuscationError::InvalidScale(scale))?;
        Ok(Self {
            scale,
            exp: Some(exp),
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Distribution<f64> for Laplace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.exp {
            Some(exp) => exp.sample(rng) - exp.sample(rng),
            None => 0.0,
        }
    }
}
