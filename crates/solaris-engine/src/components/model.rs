use glam::{DMat4, DQuat, DVec3};

use super::Lifecycle;

/// Spatial state of a body. Position is world space in scene units.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComponent {
    pub position: DVec3,
    /// Sphere radius per axis, scene units.
    pub scale: DVec3,
    pub tilt: DQuat,
    pub spin: DQuat,
    /// `tilt * spin`, rebuilt every frame.
    pub rotation: DQuat,
    pub axis_of_rotation: DVec3,
    pub axial_tilt_deg: f64,
    /// Sidereal period in hours. Negative for retrograde rotation, zero for none.
    pub rotation_period_hours: f64,
    pub lifecycle: Lifecycle,
    /// Written by frustum culling.
    pub visible: bool,
    /// Multiplier on the visual radius for collision, culling and picking.
    pub bounding_box_scale: f64,
    pub transform: DMat4,
}

impl ModelComponent {
    pub fn sphere(radius: f64) -> Self {
        Self {
            position: DVec3::ZERO,
            scale: DVec3::splat(radius),
            tilt: DQuat::IDENTITY,
            spin: DQuat::IDENTITY,
            rotation: DQuat::IDENTITY,
            axis_of_rotation: DVec3::Y,
            axial_tilt_deg: 0.0,
            rotation_period_hours: 0.0,
            lifecycle: Lifecycle::Uninitialized,
            visible: true,
            bounding_box_scale: 1.0,
            transform: DMat4::IDENTITY,
        }
    }

    // -- Builder pattern --

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_axial_tilt(mut self, degrees: f64) -> Self {
        self.axial_tilt_deg = degrees;
        self
    }

    pub fn with_rotation_period(mut self, hours: f64) -> Self {
        self.rotation_period_hours = hours;
        self
    }

    pub fn with_bounding_box_scale(mut self, factor: f64) -> Self {
        self.bounding_box_scale = factor;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Radius used by collision, culling and picking.
    pub fn bounding_radius(&self) -> f64 {
        self.scale.max_element() * self.bounding_box_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_radius_uses_largest_axis() {
        let mut m = ModelComponent::sphere(2.0).with_bounding_box_scale(1.5);
        m.scale.y = 3.0;
        assert_eq!(m.bounding_radius(), 4.5);
        assert!(!m.is_ready());
    }
}
