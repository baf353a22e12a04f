//! Property-based tests for the orbit math.

use proptest::prelude::*;
use std::f64::consts::TAU;

use super::anomaly::{ecliptic_to_scene, kepler_to_cartesian, orbit_normal, sample_orbit, solve_kepler};
use crate::components::OrbitalElements;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The capped solver converges across the whole elliptic range.
    #[test]
    fn prop_kepler_solver_convergence(
        mean_anomaly_normalized in 0.0f64..1.0,
        eccentricity in 0.0f64..=0.99,
    ) {
        let mean_anomaly = mean_anomaly_normalized * TAU;
        let e_anom = solve_kepler(mean_anomaly, eccentricity);
        let residual = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        prop_assert!(
            residual.abs() < 1e-4,
            "M={}, e={}, E={}, residual={}",
            mean_anomaly, eccentricity, e_anom, residual
        );
    }

    /// Distance from the focus stays within [a(1-e), a(1+e)].
    #[test]
    fn prop_radius_between_apsides(
        a in 1.0f64..1e9,
        e in 0.0f64..0.95,
        i in 0.0f64..180.0,
        node in 0.0f64..360.0,
        peri in 0.0f64..360.0,
        m in 0.0f64..360.0,
    ) {
        let el = OrbitalElements {
            semi_major_axis: a,
            eccentricity: e,
            inclination: i,
            longitude_of_ascending_node: node,
            argument_of_periapsis: peri,
            mean_anomaly: m,
        };
        let r = kepler_to_cartesian(&el).length();
        let slack = a * 1e-9;
        prop_assert!(r >= a * (1.0 - e) - slack && r <= a * (1.0 + e) + slack, "r={}", r);
    }

    /// Sampled trails close on themselves and lie in the orbital plane.
    #[test]
    fn prop_sampled_orbit_closed_and_planar(
        e in 0.0f64..0.9,
        i in 0.0f64..180.0,
        node in 0.0f64..360.0,
        peri in 0.0f64..360.0,
        segments in 8usize..720,
    ) {
        let el = OrbitalElements {
            semi_major_axis: 1000.0,
            eccentricity: e,
            inclination: i,
            longitude_of_ascending_node: node,
            argument_of_periapsis: peri,
            mean_anomaly: 0.0,
        };
        let path = sample_orbit(&el, segments);
        prop_assert_eq!(path.len(), segments + 1);
        prop_assert!((path[0] - path[segments]).length() < 1e-6);
        let n = orbit_normal(&el);
        for p in &path {
            prop_assert!(p.dot(n).abs() < 1e-6);
        }
    }

    /// The scene axis swap preserves lengths.
    #[test]
    fn prop_axis_swap_is_isometric(x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e6f64..1e6) {
        let v = glam::DVec3::new(x, y, z);
        prop_assert!((ecliptic_to_scene(v).length() - v.length()).abs() < 1e-6);
    }
}
