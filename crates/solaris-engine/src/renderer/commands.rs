//! Concrete draw commands produced by the render systems.

use std::rc::Rc;

use glam::{DMat4, DQuat, DVec3, Mat4, Vec3, Vec4};

use super::traits::{DrawCommand, GpuContext, MeshKind};

/// Eclipse data passed to the body shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowUniforms {
    /// World space → light clip space.
    pub light_space: DMat4,
    pub occluder_center: DVec3,
    pub occluder_radius: f64,
}

/// A textured or flat-colored sphere.
#[derive(Debug, Clone)]
pub struct BodyDraw {
    pub label: String,
    pub center: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
    pub texture: Option<String>,
    pub color: [f32; 3],
    pub shadow: Option<ShadowUniforms>,
}

impl BodyDraw {
    /// Model matrix with the camera at the origin.
    pub fn model_relative(&self, camera: DVec3) -> Mat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.center - camera).as_mat4()
    }
}

impl DrawCommand for BodyDraw {
    fn validate(&self, gpu: &dyn GpuContext) -> bool {
        self.texture.as_deref().is_none_or(|key| gpu.has_texture(key))
    }

    fn execute(&self, gpu: &mut dyn GpuContext) {
        let camera = gpu.frame().camera_position;
        gpu.set_mat4("u_model", &self.model_relative(camera));
        gpu.set_vec3("u_color", Vec3::from(self.color));
        match &self.texture {
            Some(key) => {
                gpu.bind_texture(key, 0, "u_texture");
                gpu.set_f32("u_use_texture", 1.0);
            }
            None => gpu.set_f32("u_use_texture", 0.0),
        }
        match &self.shadow {
            Some(shadow) => {
                // The shader sees camera-relative positions; undo the offset first.
                let light = (shadow.light_space * DMat4::from_translation(camera)).as_mat4();
                gpu.set_mat4("u_light_space", &light);
                let c = (shadow.occluder_center - camera).as_vec3();
                gpu.set_vec4("u_occluder", Vec4::new(c.x, c.y, c.z, shadow.occluder_radius as f32));
                gpu.set_f32("u_shadowed", 1.0);
            }
            None => gpu.set_f32("u_shadowed", 0.0),
        }
        gpu.draw_mesh(MeshKind::Sphere);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// A polyline offset from a world-space origin, e.g. an orbit about its focus.
#[derive(Debug, Clone)]
pub struct TrailDraw {
    pub origin: DVec3,
    pub points: Rc<[DVec3]>,
    pub color: [f32; 3],
    pub alpha: f32,
}

impl DrawCommand for TrailDraw {
    fn validate(&self, _gpu: &dyn GpuContext) -> bool {
        self.points.len() >= 2
    }

    fn execute(&self, gpu: &mut dyn GpuContext) {
        let base = self.origin - gpu.frame().camera_position;
        let points: Vec<Vec3> = self.points.iter().map(|&p| (base + p).as_vec3()).collect();
        gpu.set_vec3("u_color", Vec3::from(self.color));
        gpu.set_f32("u_alpha", self.alpha);
        gpu.draw_lines(&points, false);
    }

    fn label(&self) -> &str {
        "trail"
    }
}

/// Wireframe bounding box around a body.
#[derive(Debug, Clone)]
pub struct BoundsDraw {
    pub center: DVec3,
    pub half_extent: f64,
    pub rotation: DQuat,
    pub color: [f32; 3],
}

impl DrawCommand for BoundsDraw {
    fn execute(&self, gpu: &mut dyn GpuContext) {
        let camera = gpu.frame().camera_position;
        let model = DMat4::from_scale_rotation_translation(
            DVec3::splat(self.half_extent),
            self.rotation,
            self.center - camera,
        );
        gpu.set_mat4("u_model", &model.as_mat4());
        gpu.set_vec3("u_color", Vec3::from(self.color));
        gpu.draw_mesh(MeshKind::WireBox);
    }

    fn label(&self) -> &str {
        "bounds"
    }
}

/// Point sprites around a world-space origin.
#[derive(Debug, Clone)]
pub struct PointCloudDraw {
    pub origin: DVec3,
    pub points: Rc<[DVec3]>,
    pub size: f32,
    pub color: [f32; 3],
    pub alpha: f32,
}

impl DrawCommand for PointCloudDraw {
    fn validate(&self, _gpu: &dyn GpuContext) -> bool {
        !self.points.is_empty()
    }

    fn execute(&self, gpu: &mut dyn GpuContext) {
        let base = self.origin - gpu.frame().camera_position;
        let points: Vec<Vec3> = self.points.iter().map(|&p| (base + p).as_vec3()).collect();
        gpu.set_vec3("u_color", Vec3::from(self.color));
        gpu.set_f32("u_alpha", self.alpha);
        gpu.draw_points(&points, self.size);
    }

    fn label(&self) -> &str {
        "dust"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingBackend;

    fn earth(texture: Option<&str>) -> BodyDraw {
        BodyDraw {
            label: "Earth".into(),
            center: DVec3::new(1.0e9, 0.0, 0.0),
            rotation: DQuat::IDENTITY,
            scale: DVec3::splat(2.0),
            texture: texture.map(String::from),
            color: [1.0; 3],
            shadow: None,
        }
    }

    #[test]
    fn body_waits_for_its_texture() {
        let mut gpu = RecordingBackend::default();
        let body = earth(Some("earth"));
        assert!(!body.validate(&gpu));
        gpu.textures.insert("earth".into());
        assert!(body.validate(&gpu));
        assert!(earth(None).validate(&gpu));
    }

    #[test]
    fn body_model_is_camera_relative() {
        let mut gpu = RecordingBackend::default();
        gpu.frame.camera_position = DVec3::new(1.0e9 - 10.0, 0.0, 0.0);
        earth(None).execute(&mut gpu);
        let (name, model) = &gpu.mat4s[0];
        assert_eq!(name, "u_model");
        assert_eq!(model.w_axis.truncate(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(model.x_axis.x, 2.0);
        assert!(gpu.log.contains(&"mesh:Sphere".to_string()));
    }

    #[test]
    fn shadowed_body_sets_light_space() {
        let mut gpu = RecordingBackend::default();
        let mut body = earth(None);
        body.shadow = Some(ShadowUniforms {
            light_space: DMat4::IDENTITY,
            occluder_center: DVec3::ZERO,
            occluder_radius: 1.0,
        });
        body.execute(&mut gpu);
        assert!(gpu.mat4s.iter().any(|(n, _)| n == "u_light_space"));
    }

    #[test]
    fn trail_offsets_points_by_origin() {
        let mut gpu = RecordingBackend::default();
        let trail = TrailDraw {
            origin: DVec3::new(5.0, 0.0, 0.0),
            points: Rc::from(vec![DVec3::ZERO, DVec3::X, DVec3::ZERO]),
            color: [1.0; 3],
            alpha: 0.5,
        };
        assert!(trail.validate(&gpu));
        trail.execute(&mut gpu);
        assert_eq!(gpu.log.last().unwrap(), "lines:3:false");
    }
}
