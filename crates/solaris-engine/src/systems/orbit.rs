use std::collections::HashSet;
use std::rc::Rc;

use glam::DVec3;
use log::warn;

use crate::api::config::ScaleFactors;
use crate::components::{Lifecycle, LengthUnit, ModelComponent, MoonOf, OrbitComponent};
use crate::core::registry::{Entity, Registry};
use crate::orbit::anomaly::{ecliptic_to_scene, kepler_to_cartesian, normalize_degrees, sample_orbit};
use crate::orbit::epoch::{calculate_epoch_time, J2000_JD, SECONDS_PER_DAY};

/// Propagates Keplerian orbits and writes body positions.
///
/// Planets (orbits without a parent) are finalized before moons, so a moon
/// always composes onto its parent's position from the same frame.
pub struct OrbitSystem {
    /// Julian date at simulation day 0.
    start_jd: f64,
    /// Simulated days since start.
    sim_days: f64,
    segments: usize,
    scale: ScaleFactors,
    warned: HashSet<Entity>,
    order_probe: Option<Vec<Entity>>,
}

impl OrbitSystem {
    pub fn new(start_jd: f64, segments: usize, scale: ScaleFactors) -> Self {
        Self {
            start_jd,
            sim_days: 0.0,
            segments,
            scale,
            warned: HashSet::new(),
            order_probe: None,
        }
    }

    pub fn sim_days(&self) -> f64 {
        self.sim_days
    }

    /// Days from J2000 to the current simulated instant.
    pub fn days_since_j2000(&self) -> f64 {
        self.start_jd - J2000_JD + self.sim_days
    }

    pub fn current_jd(&self) -> f64 {
        self.start_jd + self.sim_days
    }

    /// New length scale. Orbits must be re-initialized to rebuild their paths.
    pub fn set_scale(&mut self, scale: ScaleFactors) {
        self.scale = scale;
    }

    /// Record the order in which body positions are finalized each frame.
    pub fn enable_order_probe(&mut self) {
        self.order_probe = Some(Vec::new());
    }

    /// Finalization order of the last update. Empty unless the probe is enabled.
    pub fn finalized_order(&self) -> &[Entity] {
        self.order_probe.as_deref().unwrap_or(&[])
    }

    fn unit_scale(&self, unit: LengthUnit) -> f64 {
        match unit {
            LengthUnit::Kilometers => self.scale.distance,
            LengthUnit::Scene => self.scale.scene,
        }
    }

    /// Position relative to the focus at simulation day `days`, scene units.
    pub fn relative_position(&self, orbit: &OrbitComponent, days: f64) -> DVec3 {
        let m = normalize_degrees(orbit.mean_anomaly_at_start + orbit.mean_motion() * days);
        let p = kepler_to_cartesian(&orbit.elements.at_mean_anomaly(m));
        ecliptic_to_scene(p) * self.unit_scale(orbit.unit)
    }

    fn initialize(&self, orbit: &mut OrbitComponent) {
        let offset_days = calculate_epoch_time(self.start_jd, orbit.epoch_jd) / SECONDS_PER_DAY;
        orbit.mean_anomaly_at_start =
            normalize_degrees(orbit.elements.mean_anomaly + orbit.mean_motion() * offset_days);
        let k = self.unit_scale(orbit.unit);
        let path: Vec<DVec3> = sample_orbit(&orbit.elements, self.segments)
            .into_iter()
            .map(|p| ecliptic_to_scene(p) * k)
            .collect();
        orbit.path = Rc::from(path);
        orbit.lifecycle = Lifecycle::Ready;
    }

    /// Advance simulated time by `dt_sim` seconds and reposition every orbiting body.
    pub fn update(&mut self, registry: &mut Registry, dt_sim: f64) {
        self.sim_days += dt_sim / SECONDS_PER_DAY;
        if let Some(probe) = self.order_probe.as_mut() {
            probe.clear();
        }

        let (moons, planets): (Vec<Entity>, Vec<Entity>) = registry
            .entities_with::<OrbitComponent>()
            .into_iter()
            .partition(|&e| registry.has::<MoonOf>(e));

        for entity in planets {
            if let Some(rel) = self.step_orbit(registry, entity) {
                if let Some(model) = registry.get_mut::<ModelComponent>(entity) {
                    model.position = rel;
                }
                self.record(entity);
            }
        }

        for entity in moons {
            let Some(&MoonOf(parent)) = registry.get::<MoonOf>(entity) else {
                continue;
            };
            if !registry.is_ready(entity) {
                continue;
            }
            let parent_position = match registry.get::<ModelComponent>(parent) {
                Some(model) if model.is_ready() => model.position,
                _ => {
                    if self.warned.insert(entity) {
                        warn!(
                            "moon {} ({entity}) has no ready parent {parent}; skipping",
                            registry.name(entity).unwrap_or("?")
                        );
                    }
                    continue;
                }
            };
            if let Some(rel) = self.step_orbit(registry, entity) {
                if let Some(model) = registry.get_mut::<ModelComponent>(entity) {
                    model.position = parent_position + rel;
                }
                self.record(entity);
            }
        }
    }

    /// Initialize on first visit, then compute this frame's relative position.
    /// `None` when the body is not ready yet.
    fn step_orbit(&self, registry: &mut Registry, entity: Entity) -> Option<DVec3> {
        if !registry.is_ready(entity) {
            return None;
        }
        let orbit = registry.get_mut::<OrbitComponent>(entity)?;
        if orbit.lifecycle == Lifecycle::Uninitialized {
            self.initialize(orbit);
        }
        let rel = self.relative_position(orbit, self.sim_days);
        orbit.relative_position = rel;
        Some(rel)
    }

    fn record(&mut self, entity: Entity) {
        if let Some(probe) = self.order_probe.as_mut() {
            probe.push(entity);
        }
    }
}
