use std::collections::HashMap;

use glam::{DMat4, DVec3};

use crate::components::{BodyKind, ModelComponent, MoonOf, RenderComponent, ShadowComponent};
use crate::core::registry::{Entity, Registry};

/// Computes eclipse shadows between moons and their planets.
///
/// Each moon is shadowed by its parent. A planet is shadowed by whichever of
/// its moons lies closest to the star→planet line, provided that moon is on
/// the star's side.
pub struct ShadowSystem {
    extent_factor: f64,
}

impl ShadowSystem {
    pub fn new(extent_factor: f64) -> Self {
        Self { extent_factor }
    }

    pub fn update(&self, registry: &mut Registry) {
        let light = star_position(registry);

        let mut casters: HashMap<Entity, Entity> = HashMap::new();
        let mut best_for_planet: HashMap<Entity, (f64, Entity)> = HashMap::new();

        for (moon, &MoonOf(parent)) in registry.iter::<MoonOf>() {
            let (Some(m), Some(p)) = (
                registry.get::<ModelComponent>(moon).filter(|m| m.is_ready()),
                registry.get::<ModelComponent>(parent).filter(|m| m.is_ready()),
            ) else {
                continue;
            };
            casters.insert(moon, parent);

            let to_moon = m.position - light;
            let to_planet = p.position - light;
            if to_moon.length_squared() >= to_planet.length_squared() {
                continue;
            }
            let alignment = to_moon.normalize_or_zero().dot(to_planet.normalize_or_zero());
            let best = best_for_planet.entry(parent).or_insert((f64::NEG_INFINITY, moon));
            if alignment > best.0 {
                *best = (alignment, moon);
            }
        }
        casters.extend(best_for_planet.into_iter().map(|(planet, (_, moon))| (planet, moon)));

        for entity in registry.entities_with::<ModelComponent>() {
            let shadow = casters.get(&entity).and_then(|&occluder| {
                let receiver = registry.get::<ModelComponent>(entity)?;
                let caster = registry.get::<ModelComponent>(occluder)?;
                let radius = caster.bounding_radius();
                Some(ShadowComponent {
                    occluder,
                    light_space: light_space_matrix(
                        light,
                        caster.position,
                        radius * self.extent_factor,
                        receiver.position,
                    ),
                    occluder_center: caster.position,
                    occluder_radius: radius,
                })
            });
            match shadow {
                Some(s) => {
                    registry.insert(entity, s);
                }
                None => {
                    registry.remove::<ShadowComponent>(entity);
                }
            }
        }
    }
}

/// World position of the first star, or the origin when there is none.
pub fn star_position(registry: &Registry) -> DVec3 {
    registry
        .iter::<RenderComponent>()
        .find(|(_, r)| r.kind == BodyKind::Star)
        .and_then(|(e, _)| registry.get::<ModelComponent>(e))
        .map_or(DVec3::ZERO, |m| m.position)
}

/// Orthographic projection looking from the light through the occluder.
/// The box is `2·half_extent` wide and deep enough to reach the receiver.
pub fn light_space_matrix(light: DVec3, occluder: DVec3, half_extent: f64, receiver: DVec3) -> DMat4 {
    let dir = (occluder - light).normalize_or(DVec3::NEG_Z);
    let up = if dir.cross(DVec3::Y).length_squared() < 1e-12 { DVec3::Z } else { DVec3::Y };
    let eye = occluder - dir * 2.0 * half_extent;
    let depth = (receiver - eye).dot(dir) + 2.0 * half_extent;
    let far = depth.max(4.0 * half_extent);
    let view = DMat4::look_to_rh(eye, dir, up);
    let proj = DMat4::orthographic_rh_gl(
        -half_extent,
        half_extent,
        -half_extent,
        half_extent,
        0.0,
        far,
    );
    proj * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Lifecycle;
    use approx::assert_relative_eq;

    fn body(reg: &mut Registry, kind: BodyKind, at: DVec3, radius: f64) -> Entity {
        let e = reg.spawn();
        let mut m = ModelComponent::sphere(radius).with_position(at);
        m.lifecycle = Lifecycle::Ready;
        reg.insert(e, m);
        reg.insert(e, RenderComponent::new(kind));
        e
    }

    fn system() -> (Registry, Entity, Entity) {
        let mut reg = Registry::new();
        body(&mut reg, BodyKind::Star, DVec3::ZERO, 50.0);
        let planet = body(&mut reg, BodyKind::Planet, DVec3::new(1_000.0, 0.0, 0.0), 10.0);
        let moon = body(&mut reg, BodyKind::Moon, DVec3::new(980.0, 0.0, 0.0), 2.0);
        reg.insert(moon, MoonOf(planet));
        (reg, planet, moon)
    }

    #[test]
    fn moon_between_star_and_planet_shadows_planet() {
        let (mut reg, planet, moon) = system();
        ShadowSystem::new(1.5).update(&mut reg);

        let on_planet = reg.get::<ShadowComponent>(planet).unwrap();
        assert_eq!(on_planet.occluder, moon);
        assert_eq!(on_planet.occluder_radius, 2.0);
        assert_eq!(reg.get::<ShadowComponent>(moon).unwrap().occluder, planet);
    }

    #[test]
    fn moon_behind_planet_casts_nothing() {
        let (mut reg, planet, moon) = system();
        let sys = ShadowSystem::new(1.5);
        sys.update(&mut reg);
        reg.get_mut::<ModelComponent>(moon).unwrap().position = DVec3::new(1_020.0, 0.0, 0.0);
        sys.update(&mut reg);
        assert!(!reg.has::<ShadowComponent>(planet));
        assert!(reg.has::<ShadowComponent>(moon));
    }

    #[test]
    fn occluder_projects_to_light_space_center() {
        let m = light_space_matrix(DVec3::ZERO, DVec3::new(0.0, 0.0, -500.0), 3.0, DVec3::new(0.0, 0.0, -600.0));
        let occluder = m.project_point3(DVec3::new(0.0, 0.0, -500.0));
        assert_relative_eq!(occluder.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(occluder.y, 0.0, epsilon = 1e-9);
        let receiver = m.project_point3(DVec3::new(0.0, 0.0, -600.0));
        assert!(receiver.z.abs() <= 1.0);
        let edge = m.project_point3(DVec3::new(3.0, 0.0, -500.0));
        assert_relative_eq!(edge.x.abs(), 1.0, epsilon = 1e-9);
    }
}
