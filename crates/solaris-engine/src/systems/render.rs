use std::collections::HashMap;
use std::rc::Rc;

use glam::DVec3;

use crate::api::config::Settings;
use crate::components::{
    BodyKind, EntitySelectionComponent, HighlightComponent, ModelComponent, MoonOf, OrbitComponent,
    RenderComponent, ShadowComponent,
};
use crate::core::registry::{Entity, Registry};
use crate::renderer::commands::{BodyDraw, BoundsDraw, PointCloudDraw, ShadowUniforms, TrailDraw};
use crate::renderer::pipeline::Renderer;
use crate::renderer::queue::{CommandHandle, QueuedCommand};
use crate::renderer::traits::{ProgramId, RenderPass};

const TRAIL_ALPHA: f32 = 0.35;
const MOON_TRAIL_ALPHA: f32 = 0.25;
const BOUNDS_COLOR: [f32; 3] = [0.3, 1.0, 0.45];
const DUST_COLOR: [f32; 3] = [0.75, 0.7, 0.65];
const DUST_ALPHA: f32 = 0.25;
const DUST_POINT_SIZE: f32 = 1.5;

/// Turns registry state into queued draw commands.
///
/// Planet trails never move, so each is queued once as a persistent command
/// and tracked here by handle. Everything else is rebuilt every frame.
#[derive(Default)]
pub struct RenderSystems {
    trails: HashMap<Entity, CommandHandle>,
}

impl RenderSystems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trail_count(&self) -> usize {
        self.trails.len()
    }

    /// Remove every persistent trail. They are re-queued once their orbits
    /// are READY again.
    pub fn clear_trails(&mut self, renderer: &mut Renderer) {
        for (_, handle) in self.trails.drain() {
            renderer.remove(handle);
        }
    }

    pub fn enqueue(
        &mut self,
        registry: &Registry,
        renderer: &mut Renderer,
        settings: &Settings,
        dust: Option<&Rc<[DVec3]>>,
    ) {
        renderer.clear_transient();
        self.prune(registry, renderer);
        enqueue_bodies(registry, renderer, settings);
        self.enqueue_planet_trails(registry, renderer);
        enqueue_moon_trails(registry, renderer);
        if settings.show_orbit_highlight {
            enqueue_highlights(registry, renderer);
        }
        if settings.show_bounding_boxes {
            enqueue_bounds(registry, renderer);
        }
        if let Some(points) = dust.filter(|_| settings.show_dust_cloud) {
            renderer.enqueue(QueuedCommand::new(
                ProgramId::DUST,
                RenderPass::Transparent,
                PointCloudDraw {
                    origin: DVec3::ZERO,
                    points: Rc::clone(points),
                    size: DUST_POINT_SIZE,
                    color: DUST_COLOR,
                    alpha: DUST_ALPHA,
                },
            ));
        }
    }

    fn prune(&mut self, registry: &Registry, renderer: &mut Renderer) {
        self.trails.retain(|&entity, handle| {
            let keep = registry.get::<OrbitComponent>(entity).is_some_and(|o| o.is_ready());
            if !keep {
                renderer.remove(*handle);
            }
            keep
        });
    }

    fn enqueue_planet_trails(&mut self, registry: &Registry, renderer: &mut Renderer) {
        for (entity, orbit) in registry.iter::<OrbitComponent>() {
            if !orbit.is_ready() || registry.has::<MoonOf>(entity) || self.trails.contains_key(&entity) {
                continue;
            }
            let Some(render) = registry.get::<RenderComponent>(entity) else {
                continue;
            };
            if render.kind == BodyKind::Asteroid {
                continue;
            }
            let handle = renderer.enqueue(
                QueuedCommand::new(
                    ProgramId::TRAIL,
                    RenderPass::Transparent,
                    TrailDraw {
                        origin: DVec3::ZERO,
                        points: Rc::clone(&orbit.path),
                        color: render.color,
                        alpha: TRAIL_ALPHA,
                    },
                )
                .persistent(),
            );
            self.trails.insert(entity, handle);
        }
    }
}

fn enqueue_bodies(registry: &Registry, renderer: &mut Renderer, settings: &Settings) {
    for (entity, render) in registry.iter::<RenderComponent>() {
        if render.kind == BodyKind::Asteroid && !settings.show_asteroids {
            continue;
        }
        let Some(model) = registry.get::<ModelComponent>(entity) else {
            continue;
        };
        if !model.is_ready() || !model.visible {
            continue;
        }
        let shadow = registry.get::<ShadowComponent>(entity).map(|s| ShadowUniforms {
            light_space: s.light_space,
            occluder_center: s.occluder_center,
            occluder_radius: s.occluder_radius,
        });
        renderer.enqueue(QueuedCommand::new(
            render.program,
            RenderPass::Opaque,
            BodyDraw {
                label: registry.name(entity).unwrap_or_default().to_string(),
                center: model.position,
                rotation: model.rotation,
                scale: model.scale,
                texture: render.texture.clone(),
                color: render.color,
                shadow,
            },
        ));
    }
}

/// Focus of an orbit in world space: the parent's position for moons.
fn orbit_origin(registry: &Registry, entity: Entity) -> Option<DVec3> {
    match registry.get::<MoonOf>(entity) {
        Some(&MoonOf(parent)) => registry
            .get::<ModelComponent>(parent)
            .filter(|m| m.is_ready())
            .map(|m| m.position),
        None => Some(DVec3::ZERO),
    }
}

fn enqueue_moon_trails(registry: &Registry, renderer: &mut Renderer) {
    for (entity, _) in registry.iter::<MoonOf>() {
        let Some(orbit) = registry.get::<OrbitComponent>(entity).filter(|o| o.is_ready()) else {
            continue;
        };
        let Some(origin) = orbit_origin(registry, entity) else {
            continue;
        };
        let color = registry.get::<RenderComponent>(entity).map_or([1.0; 3], |r| r.color);
        renderer.enqueue(QueuedCommand::new(
            ProgramId::TRAIL,
            RenderPass::Transparent,
            TrailDraw {
                origin,
                points: Rc::clone(&orbit.path),
                color,
                alpha: MOON_TRAIL_ALPHA,
            },
        ));
    }
}

fn enqueue_highlights(registry: &Registry, renderer: &mut Renderer) {
    for (entity, highlight) in registry.iter::<HighlightComponent>() {
        let Some(orbit) = registry.get::<OrbitComponent>(entity).filter(|o| o.is_ready()) else {
            continue;
        };
        let Some(origin) = orbit_origin(registry, entity) else {
            continue;
        };
        renderer.enqueue(QueuedCommand::new(
            ProgramId::TRAIL,
            RenderPass::Overlay,
            TrailDraw {
                origin,
                points: Rc::clone(&orbit.path),
                color: highlight.color,
                alpha: 1.0,
            },
        ));
    }
}

fn enqueue_bounds(registry: &Registry, renderer: &mut Renderer) {
    for (entity, _) in registry.iter::<EntitySelectionComponent>() {
        let Some(model) = registry.get::<ModelComponent>(entity) else {
            continue;
        };
        if !model.is_ready() || !model.visible {
            continue;
        }
        renderer.enqueue(QueuedCommand::new(
            ProgramId::BOUNDS,
            RenderPass::Overlay,
            BoundsDraw {
                center: model.position,
                half_extent: model.bounding_radius(),
                rotation: model.rotation,
                color: BOUNDS_COLOR,
            },
        ));
    }
}
