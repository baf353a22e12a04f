use log::info;

use super::catalog::BodyConfig;
use crate::api::config::ScaleFactors;
use crate::components::{
    BodyKind, CcdComponent, EntitySelectionComponent, ModelComponent, MoonOf, OrbitComponent,
    RenderComponent,
};
use crate::core::registry::{Entity, Registry};
use crate::error::EngineError;

/// Spawn one body with the components its kind needs.
/// `parent` must already be resolved for moons.
pub fn spawn_body(
    registry: &mut Registry,
    config: &BodyConfig,
    parent: Option<Entity>,
    scale: &ScaleFactors,
) -> Result<Entity, EngineError> {
    let orbit = config
        .orbit
        .as_ref()
        .map(|o| {
            OrbitComponent::new(o.elements, o.period_days)
                .map(|c| c.with_unit(o.unit).with_epoch(o.epoch_jd))
                .map_err(|reason| EngineError::InvalidOrbit { body: config.name.clone(), reason })
        })
        .transpose()?;

    let entity = registry.spawn();
    if let Err(err) = registry.set_name(entity, config.name.clone()) {
        registry.despawn(entity);
        return Err(err);
    }

    let model = ModelComponent::sphere(config.radius_km * scale.size)
        .with_axial_tilt(config.axial_tilt_deg)
        .with_rotation_period(config.rotation_period_hours)
        .with_bounding_box_scale(config.bounding_box_scale);
    registry.insert(entity, model);

    let mut render = RenderComponent::new(config.kind).with_color(config.color);
    if let Some(texture) = &config.texture {
        render = render.with_texture(texture.clone());
    }
    registry.insert(entity, render);

    if let Some(orbit) = orbit {
        registry.insert(entity, orbit);
    }
    if let Some(parent) = parent {
        registry.insert(entity, MoonOf(parent));
    }
    if config.kind != BodyKind::Asteroid {
        registry.insert(entity, EntitySelectionComponent::default());
        registry.insert(entity, CcdComponent::default());
    }
    Ok(entity)
}

/// Spawn a whole catalog. Parentless bodies go first so moons can resolve
/// their parents by name regardless of catalog order.
pub fn spawn_catalog(
    registry: &mut Registry,
    catalog: &[BodyConfig],
    scale: &ScaleFactors,
) -> Result<Vec<Entity>, EngineError> {
    let mut spawned = Vec::with_capacity(catalog.len());
    for config in catalog.iter().filter(|c| c.parent.is_none()) {
        spawned.push(spawn_body(registry, config, None, scale)?);
    }
    for config in catalog.iter().filter(|c| c.parent.is_some()) {
        let parent_name = config.parent.as_deref().unwrap_or_default();
        let parent = registry.find(parent_name).ok_or_else(|| EngineError::UnknownParent {
            body: config.name.clone(),
            parent: parent_name.to_string(),
        })?;
        spawned.push(spawn_body(registry, config, Some(parent), scale)?);
    }
    info!("spawned {} bodies", spawned.len());
    Ok(spawned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::SceneConfig;
    use crate::bodies::catalog::solar_system;
    use crate::components::OrbitalElements;
    use crate::error::OrbitError;

    fn scale() -> ScaleFactors {
        ScaleFactors::new(&SceneConfig::default(), 1.0)
    }

    fn rock(name: &str, parent: Option<&str>, e: f64) -> BodyConfig {
        BodyConfig {
            name: name.into(),
            kind: if parent.is_some() { BodyKind::Moon } else { BodyKind::Planet },
            parent: parent.map(String::from),
            radius_km: 1000.0,
            axial_tilt_deg: 0.0,
            rotation_period_hours: 10.0,
            texture: None,
            color: [1.0; 3],
            bounding_box_scale: 1.0,
            orbit: Some(crate::bodies::catalog::OrbitConfig {
                elements: OrbitalElements {
                    semi_major_axis: 1e6,
                    eccentricity: e,
                    inclination: 0.0,
                    longitude_of_ascending_node: 0.0,
                    argument_of_periapsis: 0.0,
                    mean_anomaly: 0.0,
                },
                period_days: 10.0,
                epoch_jd: crate::orbit::J2000_JD,
                unit: Default::default(),
            }),
        }
    }

    #[test]
    fn spawns_full_solar_system() {
        let mut reg = Registry::new();
        let entities = spawn_catalog(&mut reg, &solar_system(), &scale()).unwrap();
        assert_eq!(entities.len(), 20);
        let moon = reg.find("Moon").unwrap();
        let earth = reg.find("Earth").unwrap();
        assert_eq!(reg.get::<MoonOf>(moon), Some(&MoonOf(earth)));
        assert!(reg.get::<OrbitComponent>(reg.find("Sun").unwrap()).is_none());
        let earth_model = reg.get::<ModelComponent>(earth).unwrap();
        assert!((earth_model.scale.x - 63.71).abs() < 1e-9);
    }

    #[test]
    fn moons_may_precede_parents() {
        let mut reg = Registry::new();
        let catalog = vec![rock("Moonlet", Some("Rock"), 0.0), rock("Rock", None, 0.0)];
        spawn_catalog(&mut reg, &catalog, &scale()).unwrap();
        assert!(reg.has::<MoonOf>(reg.find("Moonlet").unwrap()));
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let mut reg = Registry::new();
        let err = spawn_catalog(&mut reg, &[rock("Lost", Some("Nowhere"), 0.0)], &scale()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownParent { .. }));
    }

    #[test]
    fn invalid_orbit_names_the_body() {
        let mut reg = Registry::new();
        let err = spawn_catalog(&mut reg, &[rock("Comet", None, 1.2)], &scale()).unwrap_err();
        match err {
            EngineError::InvalidOrbit { body, reason } => {
                assert_eq!(body, "Comet");
                assert_eq!(reason, OrbitError::Eccentricity(1.2));
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = Registry::new();
        let err = spawn_catalog(&mut reg, &[rock("Twin", None, 0.0), rock("Twin", None, 0.0)], &scale());
        assert!(matches!(err, Err(EngineError::DuplicateName(_))));
        assert_eq!(reg.len(), 1);
    }
}
