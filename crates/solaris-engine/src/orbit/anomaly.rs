//! Keplerian two-body math. Pure functions, f64 throughout.
//!
//! Angles in the element records are degrees; the solver works in radians.

use std::f64::consts::{PI, TAU};

use glam::{DQuat, DVec3};

use crate::components::{OrbitComponent, OrbitalElements};

const MAX_ITERATIONS: usize = 10;
const TOLERANCE: f64 = 1e-6;

/// Solve Kepler's equation `E - e·sin(E) = M` for the eccentric anomaly.
///
/// Newton-Raphson seeded at `E0 = M`, stopping when the step drops below 1e-6
/// or after 10 iterations. `M` is wrapped to [-π, π) and solved on the
/// non-negative half. The root always lies in `[M, min(M + e, π)]`; a step that
/// leaves this bracket restarts from its upper end, where `f ≥ 0` and Newton
/// descends monotonically. Without that guard the seed diverges for e near 1.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let turns = ((mean_anomaly + PI) / TAU).floor();
    let wrapped = mean_anomaly - turns * TAU;
    let sign = if wrapped < 0.0 { -1.0 } else { 1.0 };
    let m = wrapped.abs();
    let e = eccentricity;

    let mut lo = m;
    let mut hi = (m + e).min(PI);
    let mut ea = m;
    for _ in 0..MAX_ITERATIONS {
        let f = ea - e * ea.sin() - m;
        if f > 0.0 {
            hi = ea;
        } else if f < 0.0 {
            lo = ea;
        } else {
            break;
        }
        let mut next = ea - f / (1.0 - e * ea.cos());
        if next < lo || next > hi {
            next = hi;
        }
        let step = (next - ea).abs();
        ea = next;
        if step < TOLERANCE {
            break;
        }
    }
    sign * ea + turns * TAU
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 { 0.0 } else { a }
}

/// Mean anomaly in degrees at Julian date `t_days`: `M0 + n·(t - epoch)`.
pub fn mean_anomaly_at_time(t_days: f64, orbit: &OrbitComponent) -> f64 {
    let elapsed = t_days - orbit.epoch_jd;
    normalize_degrees(orbit.elements.mean_anomaly + orbit.mean_motion() * elapsed)
}

/// True anomaly in degrees at Julian date `t_days`, in [0, 360).
pub fn true_anomaly_at_time(t_days: f64, orbit: &OrbitComponent) -> f64 {
    let m = mean_anomaly_at_time(t_days, orbit).to_radians();
    let e = orbit.elements.eccentricity;
    let ea = solve_kepler(m, e);
    normalize_degrees(true_anomaly_from_eccentric(ea, e).to_degrees())
}

/// `ν = 2·atan2(√(1+e)·sin(E/2), √(1−e)·cos(E/2))`, radians.
pub fn true_anomaly_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
        .atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// Rotation from the perifocal frame into the reference (ecliptic) frame:
/// `Rz(Ω)·Rx(i)·Rz(ω)`.
pub fn perifocal_rotation(elements: &OrbitalElements) -> DQuat {
    DQuat::from_rotation_z(elements.longitude_of_ascending_node.to_radians())
        * DQuat::from_rotation_x(elements.inclination.to_radians())
        * DQuat::from_rotation_z(elements.argument_of_periapsis.to_radians())
}

/// Position relative to the focus, in the ecliptic frame (Z up), in the
/// unit of `semi_major_axis`. The element's mean anomaly selects the point.
pub fn kepler_to_cartesian(elements: &OrbitalElements) -> DVec3 {
    let a = elements.semi_major_axis;
    let e = elements.eccentricity;
    let ea = solve_kepler(elements.mean_anomaly.to_radians(), e);
    let perifocal = DVec3::new(
        a * (ea.cos() - e),
        a * (1.0 - e * e).sqrt() * ea.sin(),
        0.0,
    );
    perifocal_rotation(elements) * perifocal
}

/// Normal of the orbital plane in the ecliptic frame.
pub fn orbit_normal(elements: &OrbitalElements) -> DVec3 {
    perifocal_rotation(elements) * DVec3::Z
}

/// Ecliptic (Z up) to scene axes (Y up). A proper rotation, so handedness is kept.
pub fn ecliptic_to_scene(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.z, -v.y)
}

/// Closed polyline of `segments + 1` points sampled at evenly spaced mean
/// anomalies over one revolution. Ecliptic frame, element units.
pub fn sample_orbit(elements: &OrbitalElements, segments: usize) -> Vec<DVec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|k| {
            let m = 360.0 * k as f64 / segments as f64;
            kepler_to_cartesian(&elements.at_mean_anomaly(m))
        })
        .collect()
}
