use crate::components::{CcdComponent, Lifecycle, ModelComponent};
use crate::core::registry::Registry;
use crate::renderer::camera::Camera;

/// Keeps the camera out of bodies.
///
/// When the camera is inside a body's bounding sphere it is eased toward the
/// nearest surface point by `blend` per frame rather than snapped, so a fast
/// fly-through reads as a soft bump.
pub struct CcdSystem {
    blend: f64,
}

impl CcdSystem {
    pub fn new(blend: f64) -> Self {
        Self { blend: blend.clamp(0.0, 1.0) }
    }

    /// Returns true when the camera was pushed this frame.
    pub fn update(&self, registry: &mut Registry, camera: &mut Camera) -> bool {
        let mut pushed = false;
        for entity in registry.entities_with::<CcdComponent>() {
            let Some(model) = registry.get::<ModelComponent>(entity) else {
                continue;
            };
            if !model.is_ready() {
                continue;
            }
            let (center, radius) = (model.position, model.bounding_radius());

            if let Some(ccd) = registry.get_mut::<CcdComponent>(entity) {
                ccd.lifecycle = Lifecycle::Ready;
            }

            let offset = camera.position - center;
            if offset.length_squared() >= radius * radius {
                continue;
            }
            let dir = offset.normalize_or(-camera.front());
            let surface = center + dir * radius;
            camera.position = camera.position.lerp(surface, self.blend);
            pushed = true;
        }
        pushed
    }
}
