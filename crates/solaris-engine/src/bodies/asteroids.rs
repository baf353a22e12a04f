use glam::DVec3;

use super::catalog::{BodyConfig, OrbitConfig, AU_KM};
use crate::components::{BodyKind, LengthUnit, OrbitalElements};
use crate::orbit::epoch::J2000_JD;

/// Semi-major axis range for the main belt (AU).
pub const BELT_AU_MIN: f64 = 2.2;
pub const BELT_AU_MAX: f64 = 3.2;
pub const BELT_ECC_MAX: f64 = 0.15;
pub const BELT_INC_MAX: f64 = 12.0;

/// Deterministic integer hash (no external rand crate).
pub fn asteroid_hash(seed: u32) -> u32 {
    let mut n = seed;
    n = n.wrapping_mul(2654435761);
    n ^= n >> 16;
    n = n.wrapping_mul(2246822519);
    n ^= n >> 13;
    n
}

fn frac(h: u32) -> f64 {
    h as f64 / u32::MAX as f64
}

/// Main-belt asteroids with deterministic pseudo-random elements.
pub fn generate_asteroid_belt(count: usize) -> Vec<BodyConfig> {
    (0..count as u32)
        .map(|i| {
            let h = |mul: u32, add: u32| frac(asteroid_hash(i.wrapping_mul(mul).wrapping_add(add)));
            let a_au = BELT_AU_MIN + h(7, 31) * (BELT_AU_MAX - BELT_AU_MIN);
            let shade = 0.45 + 0.2 * h(31, 401) as f32;
            BodyConfig {
                name: format!("Asteroid {}", i + 1),
                kind: BodyKind::Asteroid,
                parent: None,
                radius_km: 300.0 + h(37, 503) * 900.0,
                axial_tilt_deg: h(41, 601) * 180.0,
                rotation_period_hours: 4.0 + h(43, 701) * 20.0,
                texture: None,
                color: [shade, shade * 0.95, shade * 0.9],
                bounding_box_scale: 1.0,
                orbit: Some(OrbitConfig {
                    elements: OrbitalElements {
                        semi_major_axis: a_au * AU_KM,
                        eccentricity: h(13, 97) * BELT_ECC_MAX,
                        inclination: h(17, 131) * BELT_INC_MAX,
                        longitude_of_ascending_node: h(19, 151) * 360.0,
                        argument_of_periapsis: h(23, 211) * 360.0,
                        mean_anomaly: h(29, 277) * 360.0,
                    },
                    // Kepler's third law in solar units.
                    period_days: 365.256 * a_au.powf(1.5),
                    epoch_jd: J2000_JD,
                    unit: LengthUnit::Kilometers,
                }),
            }
        })
        .collect()
}

/// Dust particle positions (km, scene axes) in a thick ring around the belt.
pub fn generate_dust_cloud(count: usize) -> Vec<DVec3> {
    (0..count as u32)
        .map(|i| {
            let h = |mul: u32, add: u32| frac(asteroid_hash(i.wrapping_mul(mul).wrapping_add(add)));
            let r = (BELT_AU_MIN - 0.3 + h(53, 17) * (BELT_AU_MAX - BELT_AU_MIN + 0.6)) * AU_KM;
            let theta = h(59, 23) * std::f64::consts::TAU;
            let height = (h(61, 29) - 0.5) * 0.2 * r;
            DVec3::new(r * theta.cos(), height, -r * theta.sin())
        })
        .collect()
}
