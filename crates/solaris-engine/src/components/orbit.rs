use std::rc::Rc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::Lifecycle;
use crate::error::OrbitError;
use crate::orbit::epoch::J2000_JD;

/// Classical orbital elements. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    /// Mean anomaly at the orbit's epoch.
    pub mean_anomaly: f64,
}

impl OrbitalElements {
    /// Same orbit at a different mean anomaly.
    pub fn at_mean_anomaly(&self, mean_anomaly: f64) -> Self {
        Self { mean_anomaly, ..*self }
    }
}

/// Unit of `semi_major_axis`. Planet catalogs use kilometres; moon systems
/// are authored directly in scene units so they stay visible next to their parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Kilometers,
    Scene,
}

/// Keplerian orbit about the body's parent (or the origin for planets).
#[derive(Debug, Clone)]
pub struct OrbitComponent {
    pub elements: OrbitalElements,
    pub period_days: f64,
    pub epoch_jd: f64,
    pub unit: LengthUnit,
    /// Mean anomaly (degrees) at simulation day 0. Set on first visit.
    pub mean_anomaly_at_start: f64,
    /// Closed polyline relative to the orbit's focus, scene units.
    pub path: Rc<[DVec3]>,
    /// Position relative to the focus, updated every frame.
    pub relative_position: DVec3,
    pub lifecycle: Lifecycle,
}

impl OrbitComponent {
    pub fn new(elements: OrbitalElements, period_days: f64) -> Result<Self, OrbitError> {
        if !(0.0..1.0).contains(&elements.eccentricity) {
            return Err(OrbitError::Eccentricity(elements.eccentricity));
        }
        if !(period_days > 0.0) {
            return Err(OrbitError::Period(period_days));
        }
        if !(elements.semi_major_axis > 0.0) {
            return Err(OrbitError::SemiMajorAxis(elements.semi_major_axis));
        }
        Ok(Self {
            elements,
            period_days,
            epoch_jd: J2000_JD,
            unit: LengthUnit::Kilometers,
            mean_anomaly_at_start: elements.mean_anomaly,
            path: Rc::from(Vec::new()),
            relative_position: DVec3::ZERO,
            lifecycle: Lifecycle::Uninitialized,
        })
    }

    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_epoch(mut self, epoch_jd: f64) -> Self {
        self.epoch_jd = epoch_jd;
        self
    }

    /// Mean motion in degrees per day.
    pub fn mean_motion(&self) -> f64 {
        360.0 / self.period_days
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(e: f64) -> OrbitalElements {
        OrbitalElements {
            semi_major_axis: 1.0,
            eccentricity: e,
            inclination: 0.0,
            longitude_of_ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            mean_anomaly: 0.0,
        }
    }

    #[test]
    fn rejects_open_orbits_and_bad_periods() {
        assert_eq!(
            OrbitComponent::new(elements(1.0), 10.0).unwrap_err(),
            OrbitError::Eccentricity(1.0)
        );
        assert_eq!(
            OrbitComponent::new(elements(-0.1), 10.0).unwrap_err(),
            OrbitError::Eccentricity(-0.1)
        );
        assert_eq!(OrbitComponent::new(elements(0.5), 0.0).unwrap_err(), OrbitError::Period(0.0));
        assert!(matches!(
            OrbitComponent::new(elements(0.5), f64::NAN),
            Err(OrbitError::Period(p)) if p.is_nan()
        ));
        assert!(OrbitComponent::new(elements(0.0), 10.0).is_ok());
    }

    #[test]
    fn mean_motion_is_degrees_per_day() {
        let orbit = OrbitComponent::new(elements(0.1), 360.0).unwrap();
        assert_eq!(orbit.mean_motion(), 1.0);
    }
}
