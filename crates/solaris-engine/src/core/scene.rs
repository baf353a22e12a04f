use std::collections::BTreeMap;
use std::rc::Rc;

use glam::DVec3;
use log::info;

use crate::api::config::{ScaleFactors, SceneConfig, Settings};
use crate::api::types::SceneEvent;
use crate::assets::AssetSource;
use crate::bodies::{generate_asteroid_belt, generate_dust_cloud, solar_system, spawn_catalog, BodyConfig};
use crate::components::{Lifecycle, ModelComponent, OrbitComponent};
use crate::core::registry::{Entity, Registry};
use crate::core::time::SimulationClock;
use crate::error::{EngineError, RenderError};
use crate::input::queue::{InputEvent, Key, KeySet, MouseButton};
use crate::orbit::epoch::format_date;
use crate::renderer::camera::Camera;
use crate::renderer::pipeline::Renderer;
use crate::renderer::traits::{FlushStats, FrameUniforms, RenderBackend};
use crate::systems::{
    cull_bodies, star_position, update_models, CameraLatchSystem, CcdSystem, OrbitSystem,
    RenderSystems, SelectionSystem, ShadowSystem,
};

/// The simulation root. Owns the registry, the camera, every system and the
/// renderer, and runs them in a fixed order once per frame.
pub struct Scene {
    config: SceneConfig,
    global_scale: f64,
    registry: Registry,
    camera: Camera,
    renderer: Renderer,
    clock: SimulationClock,

    orbits: OrbitSystem,
    ccd: CcdSystem,
    latch: CameraLatchSystem,
    selection: SelectionSystem,
    shadows: ShadowSystem,
    render_systems: RenderSystems,

    keys: KeySet,
    pointer_locked: bool,
    dragging: bool,
    viewport: (u32, u32),
    events: Vec<SceneEvent>,
    last_latch_request: Option<u32>,
    last_date: String,

    /// Dust positions in km; `dust` is the same cloud in scene units.
    dust_km: Vec<DVec3>,
    dust: Option<Rc<[DVec3]>>,
}

impl Scene {
    /// Build a scene from an explicit catalog.
    pub fn new(config: SceneConfig, catalog: &[BodyConfig], width: u32, height: u32) -> Result<Self, EngineError> {
        let scale = ScaleFactors::new(&config, 1.0);
        let mut registry = Registry::new();
        spawn_catalog(&mut registry, catalog, &scale)?;

        let clock = SimulationClock::new(config.start_unix_ms);
        let mut camera = Camera::new(&config);
        camera.set_viewport(width, height);

        let dust_km = generate_dust_cloud(config.dust_particles);
        let mut scene = Self {
            global_scale: 1.0,
            orbits: OrbitSystem::new(clock.start_jd(), config.orbit_segments, scale),
            ccd: CcdSystem::new(config.ccd_blend_factor),
            latch: CameraLatchSystem::new(config.latch_transition_secs, config.latch_radius_multiplier),
            selection: SelectionSystem::new(),
            shadows: ShadowSystem::new(config.shadow_extent_factor),
            render_systems: RenderSystems::new(),
            renderer: Renderer::new(width, height),
            registry,
            camera,
            clock,
            keys: KeySet::default(),
            pointer_locked: false,
            dragging: false,
            viewport: (width, height),
            events: Vec::new(),
            last_latch_request: None,
            last_date: String::new(),
            dust_km,
            dust: None,
            config,
        };
        scene.rebuild_dust(&scale);
        info!(
            "scene ready: {} entities, start JD {:.3}",
            scene.registry.len(),
            scene.clock.start_jd()
        );
        Ok(scene)
    }

    /// The built-in solar system, plus the asteroid belt when enabled.
    pub fn solar_system(config: SceneConfig, width: u32, height: u32) -> Result<Self, EngineError> {
        let mut catalog = solar_system();
        if config.spawn_asteroids {
            catalog.extend(generate_asteroid_belt(config.asteroid_count));
        }
        Self::new(config, &catalog, width, height)
    }

    // -- Accessors --

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn orbits(&self) -> &OrbitSystem {
        &self.orbits
    }

    pub fn orbits_mut(&mut self) -> &mut OrbitSystem {
        &mut self.orbits
    }

    pub fn latch(&self) -> &CameraLatchSystem {
        &self.latch
    }

    pub fn scale(&self) -> ScaleFactors {
        ScaleFactors::new(&self.config, self.global_scale)
    }

    /// Entity id → display name.
    pub fn names(&self) -> BTreeMap<u32, String> {
        self.registry.names().map(|(id, name)| (id, name.to_string())).collect()
    }

    pub fn find(&self, name: &str) -> Option<Entity> {
        self.registry.find(name)
    }

    pub fn selected(&self) -> Option<Entity> {
        self.selection.selected()
    }

    /// Current selection as UI ids.
    pub fn selection(&self) -> Vec<u32> {
        self.selection.selected().map(Entity::id).into_iter().collect()
    }

    /// Select a body by id, as if it had been clicked. The camera latches
    /// onto the new selection.
    pub fn select(&mut self, id: u32) {
        if let Some(entity) = self.registry.entity_at(id) {
            let changed = self.selection.select(&mut self.registry, entity);
            self.follow_selection(changed);
        }
    }

    /// Events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Simulated calendar date, `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        format_date(self.orbits.days_since_j2000())
    }

    // -- Frame --

    /// Advance one frame. Returns false while assets are still loading, in
    /// which case nothing runs and the input is discarded.
    pub fn update(
        &mut self,
        dt: f64,
        input: &[InputEvent],
        settings: &Settings,
        assets: &dyn AssetSource,
    ) -> bool {
        if assets.progress() < 1.0 {
            return false;
        }

        self.apply_settings(settings);
        for event in input {
            self.handle_input(event);
        }

        let (real_dt, sim_seconds) = self.clock.tick(dt, settings);
        self.orbits.update(&mut self.registry, sim_seconds);
        update_models(&mut self.registry, assets, self.orbits.days_since_j2000());
        self.ccd.update(&mut self.registry, &mut self.camera);
        self.latch.update(&mut self.registry, &mut self.camera, real_dt, &mut self.events);

        let free_keys = KeySet::default();
        let keys = if self.latch.target().is_some() { &free_keys } else { &self.keys };
        self.camera.update(real_dt, keys);

        cull_bodies(&mut self.registry, &self.camera);
        self.shadows.update(&mut self.registry);
        self.render_systems
            .enqueue(&self.registry, &mut self.renderer, settings, self.dust.as_ref());

        let date = self.date();
        if date != self.last_date {
            self.events.push(SceneEvent::DateChanged { date: date.clone() });
            self.last_date = date;
        }
        true
    }

    /// Per-frame constants for the queued commands.
    pub fn frame_uniforms(&self) -> FrameUniforms {
        let camera_position = self.camera.position;
        FrameUniforms {
            view: self.camera.view_relative().as_mat4(),
            projection: self.camera.projection_f32(),
            camera_position,
            light_position: (star_position(&self.registry) - camera_position).as_vec3(),
            time_days: self.orbits.sim_days() as f32,
        }
    }

    /// Resize the backend if the canvas changed, then flush the queue.
    pub fn render<B: RenderBackend>(&mut self, backend: &mut B) -> Result<FlushStats, RenderError> {
        let (w, h) = self.viewport;
        self.renderer.resize(backend, w, h)?;
        let frame = self.frame_uniforms();
        self.renderer.flush(backend, &frame)
    }

    // -- Settings --

    fn apply_settings(&mut self, settings: &Settings) {
        self.camera.speed = settings.camera_speed.unwrap_or(self.config.camera_speed);
        self.camera.sensitivity = settings.mouse_sensitivity.unwrap_or(self.config.mouse_sensitivity);

        let requested = if settings.global_scale > 0.0 { settings.global_scale } else { 1.0 };
        if requested != self.global_scale {
            self.rescale(requested);
        }

        if settings.latched_entity != self.last_latch_request {
            self.last_latch_request = settings.latched_entity;
            match settings.latched_entity.and_then(|id| self.registry.entity_at(id)) {
                Some(entity) => {
                    self.latch.latch_to(&mut self.registry, &mut self.camera, entity, &mut self.events)
                }
                None => self.latch.release(&mut self.registry, &mut self.camera, &mut self.events),
            }
        }
    }

    /// Apply a new global scale: body sizes, orbit paths, dust and the
    /// camera all scale by the same ratio.
    fn rescale(&mut self, global_scale: f64) {
        let ratio = global_scale / self.global_scale;
        self.global_scale = global_scale;
        let scale = self.scale();

        for entity in self.registry.entities_with::<ModelComponent>() {
            if let Some(model) = self.registry.get_mut::<ModelComponent>(entity) {
                model.scale *= ratio;
                model.position *= ratio;
            }
        }
        for entity in self.registry.entities_with::<OrbitComponent>() {
            if let Some(orbit) = self.registry.get_mut::<OrbitComponent>(entity) {
                orbit.lifecycle = Lifecycle::Uninitialized;
            }
        }
        self.render_systems.clear_trails(&mut self.renderer);
        self.orbits.set_scale(scale);
        self.rebuild_dust(&scale);
        if !self.camera.is_latched() {
            self.camera.position *= ratio;
        }
        info!("global scale set to {global_scale}");
    }

    fn rebuild_dust(&mut self, scale: &ScaleFactors) {
        self.dust = (!self.dust_km.is_empty())
            .then(|| self.dust_km.iter().map(|&p| p * scale.distance).collect());
    }

    // -- Input --

    /// Latch onto the selected body, or release when nothing is selected.
    /// Does nothing unless the selection actually changed.
    fn follow_selection(&mut self, changed: Option<SceneEvent>) {
        let Some(event) = changed else {
            return;
        };
        self.events.push(event);
        match self.selection.selected() {
            Some(entity) => {
                self.latch.latch_to(&mut self.registry, &mut self.camera, entity, &mut self.events)
            }
            None => self.latch.release(&mut self.registry, &mut self.camera, &mut self.events),
        }
    }

    fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown { key: Key::Escape } => {
                let changed = self.selection.deselect(&mut self.registry);
                self.follow_selection(changed);
                self.latch.release(&mut self.registry, &mut self.camera, &mut self.events);
            }
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => self.keys.apply(event),
            InputEvent::MouseMove { dx, dy } => {
                if self.camera.is_latched() {
                    if self.dragging || self.pointer_locked {
                        self.camera.orbit_drag(dx, dy);
                    }
                } else if self.pointer_locked && self.latch.target().is_none() {
                    self.camera.look(dx, dy);
                }
            }
            InputEvent::MouseDown { button: MouseButton::Primary } => self.dragging = true,
            InputEvent::MouseUp { button: MouseButton::Primary } => self.dragging = false,
            InputEvent::MouseDown { .. } | InputEvent::MouseUp { .. } => {}
            InputEvent::Wheel { delta } => self.camera.zoom(delta),
            InputEvent::Click { x, y } => {
                let (w, h) = self.viewport;
                let ray = self.camera.screen_ray(x, y, w as f64, h as f64);
                let changed = self.selection.click(&mut self.registry, &ray);
                self.follow_selection(changed);
            }
            InputEvent::Resize { width, height } => {
                if width > 0 && height > 0 {
                    self.viewport = (width, height);
                    self.camera.set_viewport(width, height);
                }
            }
            InputEvent::PointerLock { locked } => {
                self.pointer_locked = locked;
                if !locked {
                    self.keys.clear();
                    self.dragging = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::LoadTracker;
    use crate::components::{CameraLatchComponent, HighlightComponent, LatchPhase, MoonOf};
    use crate::orbit::epoch::SECONDS_PER_DAY;
    use crate::test_utils::RecordingBackend;
    use approx::assert_relative_eq;

    fn earth_moon() -> Vec<BodyConfig> {
        solar_system()
            .into_iter()
            .filter(|b| matches!(b.name.as_str(), "Sun" | "Earth" | "Moon"))
            .collect()
    }

    fn config() -> SceneConfig {
        SceneConfig {
            spawn_asteroids: false,
            dust_particles: 16,
            ..SceneConfig::default()
        }
    }

    fn loaded(catalog: &[BodyConfig]) -> LoadTracker {
        let keys: Vec<String> = catalog.iter().filter_map(|b| b.texture.clone()).collect();
        let mut tracker = LoadTracker::new(keys.clone());
        for k in keys {
            tracker.mark_loaded(k);
        }
        tracker
    }

    fn scene() -> (Scene, LoadTracker) {
        let catalog = earth_moon();
        let assets = loaded(&catalog);
        (Scene::new(config(), &catalog, 800, 600).unwrap(), assets)
    }

    /// Models turn READY on the first frame, orbits on the second.
    fn settle(scene: &mut Scene, settings: &Settings, assets: &LoadTracker) {
        assert!(scene.update(0.0, &[], settings, assets));
        assert!(scene.update(0.0, &[], settings, assets));
    }

    #[test]
    fn earth_returns_after_one_period() {
        let (mut scene, assets) = scene();
        let earth = scene.find("Earth").unwrap();
        let moon = scene.find("Moon").unwrap();

        const FRAMES: usize = 1_000;
        const FRAME_DT: f64 = 0.25;
        let settings = Settings {
            time_scale: 365.256 * SECONDS_PER_DAY / (FRAMES as f64 * FRAME_DT),
            ..Settings::default()
        };

        settle(&mut scene, &settings, &assets);
        let start = scene.registry().get::<ModelComponent>(earth).unwrap().position;
        assert_relative_eq!(start.length(), 149_600.0, max_relative = 0.02);

        let angle = |s: &Scene| {
            let rel = s.registry().get::<OrbitComponent>(moon).unwrap().relative_position;
            rel.z.atan2(rel.x)
        };
        let mut last = angle(&scene);
        let mut swept = 0.0;
        for _ in 0..FRAMES {
            scene.update(FRAME_DT, &[], &settings, &assets);
            let a = angle(&scene);
            let mut d = a - last;
            if d > std::f64::consts::PI {
                d -= std::f64::consts::TAU;
            } else if d < -std::f64::consts::PI {
                d += std::f64::consts::TAU;
            }
            swept += d;
            last = a;

            let parent = scene.registry().get::<ModelComponent>(earth).unwrap().position;
            let rel = scene.registry().get::<OrbitComponent>(moon).unwrap().relative_position;
            let pos = scene.registry().get::<ModelComponent>(moon).unwrap().position;
            assert_relative_eq!(pos, parent + rel, epsilon = 1e-6);
        }

        assert_relative_eq!(scene.orbits().sim_days(), 365.256, epsilon = 1e-6);
        let end = scene.registry().get::<ModelComponent>(earth).unwrap().position;
        assert!(end.distance(start) < 1e-3 * start.length(), "{start} vs {end}");

        let lunar_orbits = swept.abs() / std::f64::consts::TAU;
        assert!((lunar_orbits - 13.37).abs() < 0.05, "lunar orbits {lunar_orbits}");
    }

    #[test]
    fn update_waits_for_assets() {
        let catalog = earth_moon();
        let mut scene = Scene::new(config(), &catalog, 800, 600).unwrap();
        let pending = LoadTracker::new(["earth"]);
        assert!(!scene.update(0.1, &[], &Settings::default(), &pending));
        assert_eq!(scene.orbits().sim_days(), 0.0);
        assert!(scene.renderer().queue().is_empty());
    }

    #[test]
    fn click_selects_and_escape_clears() {
        let (mut scene, assets) = scene();
        let settings = Settings::default();
        settle(&mut scene, &settings, &assets);

        let sun = scene.find("Sun").unwrap();
        scene.camera_mut().look_at(DVec3::ZERO);
        let click = InputEvent::Click { x: 400.0, y: 300.0 };
        scene.update(0.0, &[click], &settings, &assets);
        assert_eq!(scene.selected(), Some(sun));
        assert!(scene.registry().has::<HighlightComponent>(sun));

        scene.update(0.0, &[InputEvent::KeyDown { key: Key::Escape }], &settings, &assets);
        assert_eq!(scene.selected(), None);
        let events = scene.drain_events();
        assert!(events.contains(&SceneEvent::selection(Some(sun), None)));
        assert!(events.contains(&SceneEvent::selection(None, Some(sun))));
    }

    /// Step real time until the latch on the current target reaches `phase`.
    fn run_until_phase(scene: &mut Scene, phase: LatchPhase, settings: &Settings, assets: &LoadTracker) {
        for _ in 0..400 {
            if scene.latch().phase(scene.registry()) == Some(phase) {
                return;
            }
            scene.update(0.1, &[], settings, assets);
        }
        panic!("latch never reached {phase:?}");
    }

    #[test]
    fn click_latches_onto_selected_body() {
        let (mut scene, assets) = scene();
        let settings = Settings { paused: true, ..Settings::default() };
        settle(&mut scene, &settings, &assets);

        let sun = scene.find("Sun").unwrap();
        scene.camera_mut().look_at(DVec3::ZERO);
        scene.update(0.0, &[InputEvent::Click { x: 400.0, y: 300.0 }], &settings, &assets);

        assert_eq!(scene.selected(), Some(sun));
        assert_eq!(scene.latch().target(), Some(sun));
        assert_eq!(scene.latch().phase(scene.registry()), Some(LatchPhase::Reorienting));
        assert!(scene.drain_events().contains(&SceneEvent::LatchPhaseChanged {
            entity: sun.id(),
            phase: LatchPhase::Reorienting,
        }));
    }

    #[test]
    fn selecting_another_body_restarts_reorienting() {
        let (mut scene, assets) = scene();
        let settings = Settings { paused: true, ..Settings::default() };
        settle(&mut scene, &settings, &assets);
        let earth = scene.find("Earth").unwrap();
        let moon = scene.find("Moon").unwrap();

        scene.select(earth.id());
        run_until_phase(&mut scene, LatchPhase::Transitioning, &settings, &assets);
        assert_eq!(scene.latch().target(), Some(earth));

        scene.select(moon.id());
        assert_eq!(scene.selected(), Some(moon));
        assert_eq!(scene.latch().target(), Some(moon));
        let latch = scene.registry().get::<CameraLatchComponent>(moon).unwrap();
        assert_eq!(latch.phase, LatchPhase::Reorienting);
        assert_eq!(latch.elapsed, 0.0);
        assert!(!scene.registry().has::<CameraLatchComponent>(earth));
    }

    #[test]
    fn clicking_latched_body_again_releases_camera() {
        let (mut scene, assets) = scene();
        let settings = Settings { paused: true, ..Settings::default() };
        settle(&mut scene, &settings, &assets);

        let sun = scene.find("Sun").unwrap();
        scene.camera_mut().look_at(DVec3::ZERO);
        let click = InputEvent::Click { x: 400.0, y: 300.0 };
        scene.update(0.0, &[click], &settings, &assets);
        run_until_phase(&mut scene, LatchPhase::Latched, &settings, &assets);
        assert!(scene.camera().is_latched());
        scene.drain_events();

        scene.update(0.0, &[click], &settings, &assets);
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.latch().target(), None);
        assert!(!scene.registry().has::<CameraLatchComponent>(sun));
        assert!(!scene.camera().is_latched());
        let events = scene.drain_events();
        assert!(events.contains(&SceneEvent::selection(None, Some(sun))));
        assert!(events.contains(&SceneEvent::LatchReleased { entity: sun.id() }));
    }

    #[test]
    fn latch_request_is_edge_triggered() {
        let (mut scene, assets) = scene();
        let earth = scene.find("Earth").unwrap();
        let mut settings = Settings { latched_entity: Some(earth.id()), ..Settings::default() };

        for _ in 0..200 {
            scene.update(0.1, &[], &settings, &assets);
        }
        assert_eq!(scene.latch().phase(scene.registry()), Some(LatchPhase::Latched));
        assert!(scene.camera().is_latched());

        settings.latched_entity = None;
        scene.update(0.1, &[], &settings, &assets);
        assert!(!scene.camera().is_latched());
        assert!(scene
            .drain_events()
            .contains(&SceneEvent::LatchReleased { entity: earth.id() }));
    }

    #[test]
    fn global_scale_rebuilds_paths_and_sizes() {
        let (mut scene, assets) = scene();
        let earth = scene.find("Earth").unwrap();
        let moon = scene.find("Moon").unwrap();
        let mut settings = Settings { paused: true, ..Settings::default() };
        settle(&mut scene, &settings, &assets);
        let radius = scene.registry().get::<ModelComponent>(earth).unwrap().scale.x;
        let path_r = scene.registry().get::<OrbitComponent>(moon).unwrap().path[0].length();

        settings.global_scale = 2.0;
        scene.update(0.0, &[], &settings, &assets);
        let model = scene.registry().get::<ModelComponent>(earth).unwrap();
        assert_relative_eq!(model.scale.x, 2.0 * radius, epsilon = 1e-9);
        let path = &scene.registry().get::<OrbitComponent>(moon).unwrap().path;
        assert_relative_eq!(path[0].length(), 2.0 * path_r, epsilon = 1e-6);
        assert!(scene.registry().has::<MoonOf>(moon));
    }

    #[test]
    fn render_flushes_through_backend() {
        let (mut scene, assets) = scene();
        let mut backend = RecordingBackend::default();
        backend.textures.extend(["sun", "earth", "moon"].map(String::from));
        scene.update(0.0, &[InputEvent::Resize { width: 1024, height: 768 }], &Settings::default(), &assets);
        let stats = scene.render(&mut backend).unwrap();
        assert_eq!(backend.size, (1024, 768));
        assert_eq!(backend.log.first().map(String::as_str), Some("begin"));
        assert_eq!(backend.log.last().map(String::as_str), Some("end"));
        assert!(stats.executed > 0);
    }
}
