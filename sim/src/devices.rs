use derive_more::Display;
use geo_types::Point;
use rand::{Rng, seq::IndexedRandom};
use rand_distr::{Distribution, Normal};
use serde::Serialize;

/// Points of interest that most devices cluster around.
pub const HOTSPOTS: [(f64, f64); 5] = [(2.0, 2.0), (8.0, 3.0), (5.0, 7.0), (3.0, 8.0), (7.0, 8.0)];
pub const CLUSTERED_SHARE: f64 = 0.7;
pub const HOTSPOT_SPREAD: f64 = 0.8;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[display("smartphone")]
    Smartphone,
    #[display("vehicle_gps")]
    VehicleGps,
    #[display("smart_camera")]
    SmartCamera,
    #[display("sensor_node")]
    SensorNode,
    #[display("wearable")]
    Wearable,
}

const DEVICE_MIX: [(DeviceType, f64); 5] = [
    (DeviceType::Smartphone, 0.4),
    (DeviceType::VehicleGps, 0.2),
    (DeviceType::SmartCamera, 0.15),
    (DeviceType::SensorNode, 0.15),
    (DeviceType::Wearable, 0.1),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Device {
    pub location: Point<f64>,
    pub kind: DeviceType,
}

/// IoT devices in a `city_size` x `city_size` square: 70% around [`HOTSPOTS`], clamped to
/// the city, the rest uniform.
pub fn generate<R: Rng + ?Sized>(
    city_size: f64,
    count: usize,
    rng: &mut R,
) -> anyhow::Result<Vec<Device>> {
    anyhow::ensure!(
        city_size.is_finite() && city_size >= 0.0,
        "city size must be finite and non-negative, got {city_size}"
    );
    let spread = Normal::new(0.0, HOTSPOT_SPREAD)?;
    let clustered = (CLUSTERED_SHARE * count as f64) as usize;

    let mut locations = Vec::with_capacity(count);
    for _ in 0..clustered {
        let (cx, cy) = *HOTSPOTS.choose(rng).unwrap_or(&(0.0, 0.0));
        let x = (cx + spread.sample(rng)).clamp(0.0, city_size);
        let y = (cy + spread.sample(rng)).clamp(0.0, city_size);
        locations.push(Point::new(x, y));
    }
    for _ in clustered..count {
        locations.push(Point::new(
            rng.random_range(0.0..=city_size),
            rng.random_range(0.0..=city_size),
        ));
    }

    locations
        .into_iter()
        .map(|location| -> anyhow::Result<Device> {
            let (kind, _) = DEVICE_MIX.choose_weighted(rng, |(_, weight)| *weight)?;
            Ok(Device {
                location,
                kind: *kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn devices_stay_inside_the_city() {
        let mut rng = StdRng::seed_from_u64(1);
        let devices = generate(10.0, 500, &mut rng).expect("valid parameters");
        assert_eq!(devices.len(), 500);
        assert!(devices.iter().all(|d| {
            let (x, y) = d.location.x_y();
            (0.0..=10.0).contains(&x) && (0.0..=10.0).contains(&y)
        }));
    }

    #[test]
    fn device_mix_roughly_follows_weights() {
        let mut rng = StdRng::seed_from_u64(2);
        let devices = generate(10.0, 5_000, &mut rng).expect("valid parameters");
        let mut counts = BTreeMap::new();
        for device in &devices {
            *counts.entry(device.kind).or_insert(0usize) += 1;
        }
        let share = |kind| counts.get(&kind).copied().unwrap_or(0) as f64 / 5_000.0;
        assert!((share(DeviceType::Smartphone) - 0.4).abs() < 0.04);
        assert!((share(DeviceType::Wearable) - 0.1).abs() < 0.03);
        assert_eq!(DeviceType::VehicleGps.to_string(), "vehicle_gps");
    }

    #[test]
    fn generation_is_seeded() {
        let a = generate(10.0, 50, &mut StdRng::seed_from_u64(9)).expect("valid parameters");
        let b = generate(10.0, 50, &mut StdRng::seed_from_u64(9)).expect("valid parameters");
        assert_eq!(a, b);
        assert!(generate(10.0, 0, &mut StdRng::seed_from_u64(9))
            .expect("valid parameters")
            .is_empty());
    }

    #[test]
    fn unbounded_city_is_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        for city_size in [f64::INFINITY, f64::NAN, -1.0] {
            assert!(generate(city_size, 10, &mut rng).is_err());
        }
    }
}
