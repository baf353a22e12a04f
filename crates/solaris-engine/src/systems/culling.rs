use crate::components::ModelComponent;
use crate::core::registry::Registry;
use crate::math::Frustum;
use crate::renderer::camera::Camera;

/// Writes `ModelComponent::visible` for every ready body. Returns the number culled.
///
/// Tests run camera-relative, matching the matrices the GPU sees.
pub fn cull_bodies(registry: &mut Registry, camera: &Camera) -> usize {
    let frustum = Frustum::from_view_projection(&camera.view_projection_relative());
    let mut culled = 0;
    for entity in registry.entities_with::<ModelComponent>() {
        let Some(model) = registry.get_mut::<ModelComponent>(entity) else {
            continue;
        };
        if !model.is_ready() {
            continue;
        }
        let center = model.position - camera.position;
        model.visible = frustum.intersects_sphere(center, model.bounding_radius());
        if !model.visible {
            culled += 1;
        }
    }
    culled
}
