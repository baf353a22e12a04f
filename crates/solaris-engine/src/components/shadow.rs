use glam::{DMat4, DVec3};

use crate::core::registry::Entity;

/// Light-space data for a body that can be eclipsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowComponent {
    /// The body casting the shadow onto this one.
    pub occluder: Entity,
    /// World space → orthographic light clip space.
    pub light_space: DMat4,
    pub occluder_center: DVec3,
    pub occluder_radius: f64,
}
