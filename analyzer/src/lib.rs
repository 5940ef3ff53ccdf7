//! Privacy/utility metrics shared by every anonymization strategy. All functions are pure.

use city_graph::{GraphError, Region, SpatialGraph};
use geo::{BoundingRect, Distance, Euclidean};
use geo_types::Point;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

/// Straight-line distance between a true location and its released stand-in.
pub fn location_error(original: Point<f64>, released: Point<f64>) -> f64 {
    Euclidean.distance(original, released)
}

/// Pairwise [`location_error`]; extra elements of the longer input are ignored.
pub fn location_errors<'a>(
    originals: impl IntoIterator<Item = &'a Point<f64>>,
    released: impl IntoIterator<Item = &'a Point<f64>>,
) -> Vec<f64> {
    originals
        .into_iter()
        .zip(released)
        .map(|(o, r)| location_error(*o, *r))
        .collect()
}

/// Area of the axis-aligned bounding box of the region's nodes, padded by one unit per axis
/// so adjacent grid nodes span a non-zero area. Single-node regions have extent 0.
pub fn region_extent(region: &Region, graph: &SpatialGraph) -> Result<f64, GraphError> {
    if region.len() <= 1 {
        return Ok(0.0);
    }
    Ok(region
        .positions(graph)?
        .bounding_rect()
        .map_or(0.0, |rect| (rect.width() + 1.0) * (rect.height() + 1.0)))
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Share of successful queries in percent. Zero when nothing was attempted.
pub fn coverage(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    successful as f64 / total as f64 * 100.0
}

/// Summary of per-point location errors.
///
/// An empty error list means no query succeeded; every field is then [`f64::INFINITY`] rather
/// than a panic, so batch callers can detect total failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtilityLoss {
    pub mean_error: f64,
    pub median_error: f64,
    /// Population standard deviation.
    pub std_error: f64,
    pub max_error: f64,
    pub min_error: f64,
}

impl UtilityLoss {
    pub const DEGENERATE: UtilityLoss = UtilityLoss {
        mean_error: f64::INFINITY,
        median_error: f64::INFINITY,
        std_error: f64::INFINITY,
        max_error: f64::INFINITY,
        min_error: f64::INFINITY,
    };

    pub fn from_errors(errors: &[f64]) -> Self {
        let Some(mean_error) = mean(errors) else {
            return Self::DEGENERATE;
        };
        let sorted: Vec<f64> = errors.iter().copied().sorted_by(f64::total_cmp).collect();
        let mid = sorted.len() / 2;
        let median_error = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let variance = errors
            .iter()
            .map(|e| (e - mean_error).powi(2))
            .sum::<f64>()
            / errors.len() as f64;
        let (min_error, max_error) = match sorted.iter().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => (f64::INFINITY, f64::INFINITY),
            MinMaxResult::OneElement(e) => (*e, *e),
            MinMaxResult::MinMax(lo, hi) => (*lo, *hi),
        };

        Self {
            mean_error,
            median_error,
            std_error: variance.sqrt(),
            max_error,
            min_error,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.mean_error.is_infinite()
    }
}
