use glam::{DMat3, DMat4, DQuat, DVec3, Mat4};

use crate::api::config::SceneConfig;
use crate::input::queue::{Key, KeySet};
use crate::math::Ray;

const MAX_PITCH: f64 = 89.0;
const ZOOM_SPEED: f64 = 0.001;
const BOOST: f64 = 10.0;
const AXIS_EPSILON: f64 = 1e-6;

/// Orbit state while the camera is latched to a body.
/// Angles in degrees; azimuth measured in the XZ plane from +X toward +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatchOrbit {
    pub target: DVec3,
    pub azimuth: f64,
    pub elevation: f64,
    pub radius: f64,
}

impl LatchOrbit {
    /// Camera offset from the target.
    pub fn offset(&self) -> DVec3 {
        let (az, el) = (self.azimuth.to_radians(), self.elevation.to_radians());
        self.radius * DVec3::new(el.cos() * az.cos(), el.sin(), el.cos() * az.sin())
    }
}

/// Perspective camera with free-look and latch-orbit modes.
///
/// Position is world space (f64). All matrices handed to the GPU are built
/// with the camera at the origin; draw commands subtract `position` from
/// their world positions before narrowing to f32.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: DVec3,
    orientation: DQuat,
    /// Degrees. Yaw -90 faces -Z.
    yaw: f64,
    pitch: f64,
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    /// Scene units per second.
    pub speed: f64,
    /// Degrees per pixel.
    pub sensitivity: f64,
    latch: Option<LatchOrbit>,
    min_latch_radius: f64,
    max_latch_radius: f64,
}

impl Camera {
    pub fn new(config: &SceneConfig) -> Self {
        let mut camera = Self {
            position: DVec3::new(0.0, 120_000.0, 320_000.0),
            orientation: DQuat::IDENTITY,
            yaw: -90.0,
            pitch: 0.0,
            fov_y_deg: config.fov_y_deg,
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
            speed: config.camera_speed,
            sensitivity: config.mouse_sensitivity,
            latch: None,
            min_latch_radius: config.min_latch_radius,
            max_latch_radius: config.max_latch_radius,
        };
        camera.look_at(DVec3::ZERO);
        camera
    }

    // -- Orientation --

    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    pub fn front(&self) -> DVec3 {
        self.orientation * DVec3::NEG_Z
    }

    pub fn right(&self) -> DVec3 {
        self.orientation * DVec3::X
    }

    pub fn up(&self) -> DVec3 {
        self.orientation * DVec3::Y
    }

    pub fn yaw_pitch(&self) -> (f64, f64) {
        (self.yaw, self.pitch)
    }

    /// Scripted reorientation. Yaw and pitch follow so free-look resumes
    /// from the new facing.
    pub fn set_orientation(&mut self, orientation: DQuat) {
        self.orientation = orientation.normalize();
        self.sync_yaw_pitch();
    }

    pub fn look_at(&mut self, target: DVec3) {
        let dir = target - self.position;
        if dir.length_squared() > 0.0 {
            self.set_orientation(look_rotation(dir));
        }
    }

    fn sync_yaw_pitch(&mut self) {
        let f = self.front();
        self.pitch = f.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = f.z.atan2(f.x).to_degrees();
    }

    /// Free-look from relative mouse movement. Ignored while latched.
    pub fn look(&mut self, dx: f64, dy: f64) {
        if self.latch.is_some() {
            return;
        }
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        self.orientation = yaw_pitch_rotation(self.yaw, self.pitch);
    }

    // -- Latch mode --

    pub fn is_latched(&self) -> bool {
        self.latch.is_some()
    }

    pub fn latch_orbit(&self) -> Option<&LatchOrbit> {
        self.latch.as_ref()
    }

    /// Enter orbit controls around `target`, keeping the current viewing
    /// direction by reading azimuth/elevation off the camera→target vector.
    pub fn enable_latch_mode(&mut self, target: DVec3, radius: f64) {
        let mut offset = self.position - target;
        if offset.length_squared() < AXIS_EPSILON * AXIS_EPSILON {
            offset = -self.front();
        }
        let dir = offset.normalize();
        let elevation = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-MAX_PITCH, MAX_PITCH);
        let azimuth = dir.z.atan2(dir.x).to_degrees();
        self.latch = Some(LatchOrbit {
            target,
            azimuth,
            elevation,
            radius: self.clamp_radius(radius),
        });
        self.apply_latch();
    }

    /// Leave orbit controls, facing along the last camera→target direction.
    pub fn disable_latch_mode(&mut self) {
        let Some(latch) = self.latch.take() else {
            return;
        };
        let dir = (latch.target - self.position).normalize_or_zero();
        if dir == DVec3::ZERO {
            return;
        }
        // Straight up or down has no heading; keep the current yaw.
        if dir.x.hypot(dir.z) > AXIS_EPSILON {
            self.yaw = dir.z.atan2(dir.x).to_degrees();
        }
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-MAX_PITCH, MAX_PITCH);
        self.orientation = yaw_pitch_rotation(self.yaw, self.pitch);
    }

    /// Follow a moving latch target.
    pub fn set_latch_target(&mut self, target: DVec3) {
        if let Some(latch) = self.latch.as_mut() {
            latch.target = target;
        }
    }

    /// Drag in latch mode: rotate around the target.
    pub fn orbit_drag(&mut self, dx: f64, dy: f64) {
        let sensitivity = self.sensitivity;
        if let Some(latch) = self.latch.as_mut() {
            latch.azimuth += dx * sensitivity;
            latch.elevation = (latch.elevation + dy * sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        }
    }

    /// Wheel in latch mode: positive delta moves away.
    pub fn zoom(&mut self, delta: f64) {
        let factor = (1.0 + delta * ZOOM_SPEED).max(0.1);
        if let Some(radius) = self.latch.map(|l| l.radius * factor) {
            let clamped = self.clamp_radius(radius);
            if let Some(latch) = self.latch.as_mut() {
                latch.radius = clamped;
            }
        }
    }

    fn clamp_radius(&self, radius: f64) -> f64 {
        radius.clamp(self.min_latch_radius, self.max_latch_radius)
    }

    fn apply_latch(&mut self) {
        if let Some(latch) = self.latch {
            self.position = latch.target + latch.offset();
            self.orientation = look_rotation(latch.target - self.position);
        }
    }

    // -- Per-frame --

    /// Latched: recompute position from the orbit. Free: translate along the
    /// camera axes for held movement keys.
    pub fn update(&mut self, dt: f64, keys: &KeySet) {
        if self.latch.is_some() {
            self.apply_latch();
            return;
        }
        let (front, right, up) = (self.front(), self.right(), self.up());
        let dir: DVec3 = [
            (Key::Forward, front),
            (Key::Back, -front),
            (Key::Right, right),
            (Key::Left, -right),
            (Key::Up, up),
            (Key::Down, -up),
        ]
        .into_iter()
        .filter(|&(key, _)| keys.is_down(key))
        .map(|(_, axis)| axis)
        .sum();
        if dir == DVec3::ZERO {
            return;
        }
        let boost = if keys.is_down(Key::Boost) { BOOST } else { 1.0 };
        self.position += dir.normalize() * self.speed * boost * dt;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f64 / height as f64;
        }
    }

    // -- Matrices --

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_to_rh(self.position, self.front(), self.up())
    }

    /// View with the camera at the origin.
    pub fn view_relative(&self) -> DMat4 {
        DMat4::look_to_rh(DVec3::ZERO, self.front(), self.up())
    }

    pub fn projection(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_relative(&self) -> DMat4 {
        self.projection() * self.view_relative()
    }

    pub fn projection_f32(&self) -> Mat4 {
        self.projection().as_mat4()
    }

    /// World-space picking ray through a canvas pixel (origin top-left).
    pub fn screen_ray(&self, x: f64, y: f64, width: f64, height: f64) -> Ray {
        let ndc_x = 2.0 * x / width.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height.max(1.0);
        let inv = self.view_projection_relative().inverse();
        let near = inv.project_point3(DVec3::new(ndc_x, ndc_y, -1.0));
        let far = inv.project_point3(DVec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(self.position + near, far - near)
    }
}

/// Rotation taking -Z to `dir` with +Y as the up hint.
pub fn look_rotation(dir: DVec3) -> DQuat {
    let f = dir.normalize_or_zero();
    if f == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    let hint = if f.cross(DVec3::Y).length() < AXIS_EPSILON { DVec3::Z } else { DVec3::Y };
    let r = f.cross(hint).normalize();
    let u = r.cross(f);
    DQuat::from_mat3(&DMat3::from_cols(r, u, -f)).normalize()
}

fn yaw_pitch_rotation(yaw: f64, pitch: f64) -> DQuat {
    DQuat::from_rotation_y(-(yaw + 90.0).to_radians()) * DQuat::from_rotation_x(pitch.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        let mut c = Camera::new(&SceneConfig::default());
        c.position = DVec3::ZERO;
        c.set_orientation(DQuat::IDENTITY);
        c
    }

    #[test]
    fn yaw_pitch_rotation_matches_front_convention() {
        let q = yaw_pitch_rotation(0.0, 0.0);
        assert_relative_eq!(q * DVec3::NEG_Z, DVec3::X, epsilon = 1e-12);
        let q = yaw_pitch_rotation(-90.0, 30.0);
        assert_relative_eq!((q * DVec3::NEG_Z).y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn free_look_clamps_pitch() {
        let mut c = camera();
        c.look(0.0, -10_000.0);
        assert_relative_eq!(c.yaw_pitch().1, MAX_PITCH);
        assert!(c.front().y > 0.99);
    }

    #[test]
    fn free_move_follows_front() {
        let mut c = camera();
        c.speed = 10.0;
        let mut keys = KeySet::default();
        keys.press(Key::Forward);
        c.update(0.5, &keys);
        assert_relative_eq!(c.position, DVec3::new(0.0, 0.0, -5.0), epsilon = 1e-9);
        keys.press(Key::Boost);
        c.update(0.1, &keys);
        assert_relative_eq!(c.position, DVec3::new(0.0, 0.0, -15.0), epsilon = 1e-9);
    }

    #[test]
    fn latch_mode_keeps_offset_and_follows_target() {
        let mut c = camera();
        c.position = DVec3::new(0.0, 0.0, 10.0);
        c.enable_latch_mode(DVec3::ZERO, 10.0);
        assert_relative_eq!(c.position, DVec3::new(0.0, 0.0, 10.0), epsilon = 1e-9);
        assert_relative_eq!(c.front(), DVec3::NEG_Z, epsilon = 1e-9);

        c.set_latch_target(DVec3::new(5.0, 0.0, 0.0));
        c.update(0.016, &KeySet::default());
        assert_relative_eq!(c.position, DVec3::new(5.0, 0.0, 10.0), epsilon = 1e-9);
    }

    #[test]
    fn zoom_respects_radius_bounds() {
        let mut c = camera();
        c.position = DVec3::new(0.0, 0.0, 10.0);
        c.enable_latch_mode(DVec3::ZERO, 10.0);
        for _ in 0..100 {
            c.zoom(-800.0);
        }
        assert_relative_eq!(c.latch_orbit().unwrap().radius, SceneConfig::default().min_latch_radius);
    }

    #[test]
    fn orbit_drag_clamps_elevation() {
        let mut c = camera();
        c.position = DVec3::new(10.0, 0.0, 0.0);
        c.enable_latch_mode(DVec3::ZERO, 10.0);
        c.orbit_drag(0.0, 5_000.0);
        assert_relative_eq!(c.latch_orbit().unwrap().elevation, MAX_PITCH);
    }

    #[test]
    fn disable_latch_faces_last_target() {
        let mut c = camera();
        c.position = DVec3::new(10.0, 0.0, 0.0);
        c.enable_latch_mode(DVec3::ZERO, 10.0);
        c.disable_latch_mode();
        assert!(!c.is_latched());
        assert_relative_eq!(c.front(), DVec3::NEG_X, epsilon = 1e-9);
    }

    #[test]
    fn disable_latch_leaves_no_roll() {
        let mut c = camera();
        c.position = DVec3::new(3.0, 4.0, -5.0);
        c.enable_latch_mode(DVec3::new(-2.0, 1.0, 7.0), 12.0);
        c.orbit_drag(37.0, -12.0);
        c.update(0.0, &KeySet::default());
        c.disable_latch_mode();

        // Right stays horizontal, and the first free-look step does not jump.
        assert_relative_eq!(c.right().y, 0.0, epsilon = 1e-9);
        let before = c.orientation();
        c.look(0.0, 0.0);
        assert!(c.orientation().angle_between(before) < 1e-9);
    }

    #[test]
    fn disable_latch_straight_down_keeps_yaw() {
        let mut c = camera();
        c.position = DVec3::new(10.0, 0.0, 0.0);
        c.enable_latch_mode(DVec3::ZERO, 10.0);
        let (yaw, _) = c.yaw_pitch();
        c.position = DVec3::new(0.0, 10.0, 0.0);
        c.disable_latch_mode();
        assert!(c.orientation().is_finite());
        assert_eq!(c.yaw_pitch().0, yaw);
        assert_relative_eq!(c.yaw_pitch().1, -MAX_PITCH);
    }

    #[test]
    fn look_rotation_straight_up_is_finite() {
        let q = look_rotation(DVec3::Y);
        assert!(q.is_finite());
        assert_relative_eq!(q * DVec3::NEG_Z, DVec3::Y, epsilon = 1e-9);
    }

    #[test]
    fn center_ray_points_forward() {
        let mut c = camera();
        c.position = DVec3::new(1.0, 2.0, 3.0);
        let ray = c.screen_ray(400.0, 300.0, 800.0, 600.0);
        assert_relative_eq!(ray.direction, DVec3::NEG_Z, epsilon = 1e-6);
        assert!((ray.origin - c.position).length() < 1.0);
    }
}
