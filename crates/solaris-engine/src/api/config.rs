use serde::{Deserialize, Serialize};

/// Engine configuration, fixed for the lifetime of a scene.
/// Every field has a default, so partial JSON documents are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene units per kilometre for orbital distances (default: 1e-3).
    pub distance_scale: f64,
    /// Scene units per kilometre for body radii (default: 1e-2).
    pub size_scale: f64,
    /// Segments in each cached orbit polyline (default: 360).
    pub orbit_segments: usize,
    /// Latch distance = bounding radius × this (default: 1.728).
    pub latch_radius_multiplier: f64,
    /// Fraction of the remaining penetration resolved per frame (default: 0.2).
    pub ccd_blend_factor: f64,
    /// Duration of each latch phase in seconds (default: 8).
    pub latch_transition_secs: f64,
    pub min_latch_radius: f64,
    pub max_latch_radius: f64,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    /// MSAA sample count for the offscreen target (clamped by the device).
    pub msaa_samples: u32,
    /// Shadow frustum half-extent = occluder radius × this (default: 1.5).
    pub shadow_extent_factor: f64,
    /// Free-look speed in scene units per second.
    pub camera_speed: f64,
    /// Degrees per pixel of mouse movement.
    pub mouse_sensitivity: f64,
    /// Simulation start as Unix milliseconds. `None` starts at J2000.
    pub start_unix_ms: Option<f64>,
    /// Spawn the procedural asteroid belt.
    pub spawn_asteroids: bool,
    pub asteroid_count: usize,
    pub dust_particles: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            distance_scale: 1e-3,
            size_scale: 1e-2,
            orbit_segments: 360,
            latch_radius_multiplier: 1.728,
            ccd_blend_factor: 0.2,
            latch_transition_secs: 8.0,
            min_latch_radius: 0.5,
            max_latch_radius: 500_000.0,
            fov_y_deg: 45.0,
            near: 0.5,
            far: 50_000_000.0,
            msaa_samples: 4,
            shadow_extent_factor: 1.5,
            camera_speed: 2_000.0,
            mouse_sensitivity: 0.1,
            start_unix_ms: None,
            spawn_asteroids: true,
            asteroid_count: 120,
            dust_particles: 4_000,
        }
    }
}

impl SceneConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Conversion factors from catalog units to scene units.
/// Derived from the config and the user's global scale; recomputed
/// explicitly whenever the global scale changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub distance: f64,
    pub size: f64,
    /// Multiplier for lengths already authored in scene units.
    pub scene: f64,
}

impl ScaleFactors {
    pub fn new(config: &SceneConfig, global_scale: f64) -> Self {
        let g = if global_scale > 0.0 { global_scale } else { 1.0 };
        Self {
            distance: config.distance_scale * g,
            size: config.size_scale * g,
            scene: g,
        }
    }
}

/// User-facing settings, read once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub global_scale: f64,
    pub camera_speed: Option<f64>,
    pub mouse_sensitivity: Option<f64>,
    pub show_bounding_boxes: bool,
    pub show_orbit_highlight: bool,
    /// Requested latch target by entity id. Acted on when it changes.
    pub latched_entity: Option<u32>,
    pub show_dust_cloud: bool,
    pub show_asteroids: bool,
    /// Simulated seconds per real second.
    pub time_scale: f64,
    pub paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_scale: 1.0,
            camera_speed: None,
            mouse_sensitivity: None,
            show_bounding_boxes: false,
            show_orbit_highlight: true,
            latched_entity: None,
            show_dust_cloud: true,
            show_asteroids: true,
            time_scale: 3_600.0,
            paused: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Simulated seconds elapsed for a real frame of `dt` seconds.
    pub fn sim_seconds(&self, dt: f64) -> f64 {
        if self.paused { 0.0 } else { dt * self.time_scale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = SceneConfig::from_json(r#"{ "ccd_blend_factor": 0.5 }"#).unwrap();
        assert_eq!(config.ccd_blend_factor, 0.5);
        assert_eq!(config.latch_radius_multiplier, 1.728);
        assert_eq!(config.orbit_segments, 360);
    }

    #[test]
    fn scale_factors_follow_global_scale() {
        let config = SceneConfig::default();
        let s = ScaleFactors::new(&config, 2.0);
        assert_eq!(s.distance, 2e-3);
        assert_eq!(s.size, 2e-2);
        assert_eq!(s.scene, 2.0);
        assert_eq!(ScaleFactors::new(&config, 0.0).scene, 1.0);
    }

    #[test]
    fn parse_settings() {
        let json = r#"{
            "global_scale": 1.5,
            "show_bounding_boxes": true,
            "latched_entity": 3,
            "paused": true
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.global_scale, 1.5);
        assert!(settings.show_bounding_boxes);
        assert_eq!(settings.latched_entity, Some(3));
        assert_eq!(settings.sim_seconds(0.016), 0.0);
        assert!(settings.show_dust_cloud);
    }

    #[test]
    fn malformed_settings_error() {
        assert!(Settings::from_json(r#"{ "global_scale": "big" }"#).is_err());
    }
}
