use std::f64::consts::TAU;

use glam::{DMat4, DQuat, DVec3};

use crate::assets::AssetSource;
use crate::components::{Lifecycle, ModelComponent, RenderComponent};
use crate::core::registry::Registry;

/// Bring models to READY once their texture is available, then spin them.
///
/// `sim_days` is absolute simulated time, so rotation never accumulates drift.
pub fn update_models(registry: &mut Registry, assets: &dyn AssetSource, sim_days: f64) {
    let sim_hours = sim_days * 24.0;

    for entity in registry.entities_with::<ModelComponent>() {
        let texture_ready = registry
            .get::<RenderComponent>(entity)
            .and_then(|r| r.texture.as_deref())
            .is_none_or(|key| assets.has_texture(key));

        let Some(model) = registry.get_mut::<ModelComponent>(entity) else {
            continue;
        };
        if model.lifecycle == Lifecycle::Uninitialized {
            if !texture_ready {
                continue;
            }
            initialize(model);
        }
        spin(model, sim_hours);
    }
}

fn initialize(model: &mut ModelComponent) {
    model.tilt = DQuat::from_rotation_z(model.axial_tilt_deg.to_radians());
    model.axis_of_rotation = model.tilt * DVec3::Y;
    model.lifecycle = Lifecycle::Ready;
}

fn spin(model: &mut ModelComponent, sim_hours: f64) {
    model.spin = if model.rotation_period_hours == 0.0 {
        DQuat::IDENTITY
    } else {
        let turns = (sim_hours / model.rotation_period_hours).fract();
        DQuat::from_rotation_y(TAU * turns)
    };
    model.rotation = model.tilt * model.spin;
    model.transform = DMat4::from_scale_rotation_translation(model.scale, model.rotation, model.position);
}
