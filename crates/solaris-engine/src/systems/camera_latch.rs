use glam::DVec3;
use log::info;

use crate::api::types::SceneEvent;
use crate::components::{CameraLatchComponent, LatchPhase, ModelComponent};
use crate::core::registry::{Entity, Registry};
use crate::math::{lerp, smoothstep};
use crate::renderer::camera::{look_rotation, Camera};

/// Drives the camera from free-look to an orbit around a body.
///
/// Reorienting turns the camera in place, Transitioning flies it along the
/// fixed target-relative direction to the latch distance, and Latched hands
/// control to the camera's orbit mode while following the moving body.
pub struct CameraLatchSystem {
    target: Option<Entity>,
    duration: f64,
    multiplier: f64,
}

impl CameraLatchSystem {
    pub fn new(duration: f64, multiplier: f64) -> Self {
        Self {
            target: None,
            duration: duration.max(f64::EPSILON),
            multiplier,
        }
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn phase(&self, registry: &Registry) -> Option<LatchPhase> {
        self.target
            .and_then(|e| registry.get::<CameraLatchComponent>(e))
            .map(|c| c.phase)
    }

    /// Distance at which the camera latches onto a body.
    pub fn latch_distance(&self, model: &ModelComponent) -> f64 {
        model.bounding_radius() * self.multiplier
    }

    /// Start latching onto `entity`. Re-arming on the current target does nothing;
    /// any other target restarts from Reorienting.
    pub fn latch_to(
        &mut self,
        registry: &mut Registry,
        camera: &mut Camera,
        entity: Entity,
        events: &mut Vec<SceneEvent>,
    ) {
        if self.target == Some(entity) || !registry.has::<ModelComponent>(entity) {
            return;
        }
        self.release(registry, camera, events);

        registry.insert(entity, CameraLatchComponent::new(camera.position, camera.orientation()));
        self.target = Some(entity);
        info!("latching onto {}", registry.name(entity).unwrap_or("?"));
        events.push(SceneEvent::LatchPhaseChanged {
            entity: entity.id(),
            phase: LatchPhase::Reorienting,
        });
    }

    /// Drop the latch and return the camera to free-look.
    pub fn release(&mut self, registry: &mut Registry, camera: &mut Camera, events: &mut Vec<SceneEvent>) {
        let Some(entity) = self.target.take() else {
            return;
        };
        registry.remove::<CameraLatchComponent>(entity);
        camera.disable_latch_mode();
        info!("released latch on {}", registry.name(entity).unwrap_or("?"));
        events.push(SceneEvent::LatchReleased { entity: entity.id() });
    }

    pub fn update(&mut self, registry: &mut Registry, camera: &mut Camera, dt: f64, events: &mut Vec<SceneEvent>) {
        let Some(entity) = self.target else {
            return;
        };
        let Some((center, threshold)) = registry
            .get::<ModelComponent>(entity)
            .filter(|m| m.is_ready())
            .map(|m| (m.position, self.latch_distance(m)))
        else {
            if !registry.contains(entity) {
                self.release(registry, camera, events);
            }
            return;
        };
        let Some(mut latch) = registry.get::<CameraLatchComponent>(entity).copied() else {
            self.target = None;
            return;
        };

        let before = latch.phase;
        match latch.phase {
            LatchPhase::Reorienting => self.reorient(&mut latch, camera, center, dt),
            LatchPhase::Transitioning => self.transition(&mut latch, camera, center, threshold, dt),
            LatchPhase::Latched => {
                camera.set_latch_target(center);
                if let Some(orbit) = camera.latch_orbit() {
                    latch.azimuth = orbit.azimuth;
                    latch.elevation = orbit.elevation;
                }
            }
        }

        if latch.phase != before {
            info!(
                "latch on {} -> {:?}",
                registry.name(entity).unwrap_or("?"),
                latch.phase
            );
            events.push(SceneEvent::LatchPhaseChanged {
                entity: entity.id(),
                phase: latch.phase,
            });
        }
        registry.insert(entity, latch);
    }

    fn reorient(&self, latch: &mut CameraLatchComponent, camera: &mut Camera, center: DVec3, dt: f64) {
        latch.elapsed += dt;
        let raw = latch.elapsed / self.duration;
        let goal = look_rotation(center - camera.position);
        camera.set_orientation(latch.start_orientation.slerp(goal, smoothstep(raw)));
        if raw >= 1.0 {
            latch.phase = LatchPhase::Transitioning;
            latch.elapsed = 0.0;
            latch.start_position = camera.position;
            latch.start_offset = camera.position - center;
        }
    }

    fn transition(
        &self,
        latch: &mut CameraLatchComponent,
        camera: &mut Camera,
        center: DVec3,
        threshold: f64,
        dt: f64,
    ) {
        latch.elapsed += dt;
        let raw = latch.elapsed / self.duration;
        let dir = latch.start_offset.normalize_or(-camera.front());
        let start = latch.start_offset.length();
        let distance = if raw >= 1.0 {
            threshold
        } else {
            lerp(start, threshold, smoothstep(raw))
        };

        if distance <= threshold {
            camera.position = center + dir * threshold;
            camera.enable_latch_mode(center, threshold);
            if let Some(orbit) = camera.latch_orbit() {
                latch.azimuth = orbit.azimuth;
                latch.elevation = orbit.elevation;
            }
            latch.phase = LatchPhase::Latched;
        } else {
            camera.position = center + dir * distance;
            camera.look_at(center);
        }
    }
}
