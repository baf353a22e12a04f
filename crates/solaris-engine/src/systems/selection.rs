use crate::api::types::SceneEvent;
use crate::components::{EntitySelectionComponent, HighlightComponent, Lifecycle, ModelComponent};
use crate::core::registry::{Entity, Registry};
use crate::math::Ray;

/// Click picking with single-selection toggle semantics.
#[derive(Debug, Default)]
pub struct SelectionSystem {
    selected: Option<Entity>,
}

impl SelectionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    /// Nearest selectable ready body hit by `ray`.
    pub fn pick(&self, registry: &Registry, ray: &Ray) -> Option<Entity> {
        registry
            .iter::<EntitySelectionComponent>()
            .filter_map(|(entity, _)| {
                let model = registry.get::<ModelComponent>(entity)?;
                if !model.is_ready() {
                    return None;
                }
                let t = ray.intersect_sphere(model.position, model.bounding_radius())?;
                Some((t, entity))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, entity)| entity)
    }

    /// Resolve a click. Hitting the selected body deselects it, hitting
    /// another selects it, a miss changes nothing.
    pub fn click(&mut self, registry: &mut Registry, ray: &Ray) -> Option<SceneEvent> {
        let hit = self.pick(registry, ray)?;
        if self.selected == Some(hit) {
            self.deselect(registry)
        } else {
            self.select(registry, hit)
        }
    }

    /// Select `entity`, deselecting whatever was selected before.
    pub fn select(&mut self, registry: &mut Registry, entity: Entity) -> Option<SceneEvent> {
        if self.selected == Some(entity) || !registry.has::<EntitySelectionComponent>(entity) {
            return None;
        }
        let previous = self.clear(registry);
        if let Some(sel) = registry.get_mut::<EntitySelectionComponent>(entity) {
            sel.is_selected = true;
            sel.lifecycle = Lifecycle::Ready;
        }
        registry.insert(entity, HighlightComponent::default());
        self.selected = Some(entity);
        Some(SceneEvent::selection(Some(entity), previous))
    }

    pub fn deselect(&mut self, registry: &mut Registry) -> Option<SceneEvent> {
        let previous = self.clear(registry)?;
        Some(SceneEvent::selection(None, Some(previous)))
    }

    fn clear(&mut self, registry: &mut Registry) -> Option<Entity> {
        for entity in registry.entities_with::<EntitySelectionComponent>() {
            if let Some(sel) = registry.get_mut::<EntitySelectionComponent>(entity) {
                sel.is_selected = false;
            }
            registry.remove::<HighlightComponent>(entity);
        }
        self.selected.take().filter(|&e| registry.contains(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn selectable(reg: &mut Registry, x: f64, radius: f64) -> Entity {
        let e = reg.spawn();
        let mut m = ModelComponent::sphere(radius).with_position(DVec3::new(x, 0.0, -50.0));
        m.lifecycle = Lifecycle::Ready;
        reg.insert(e, m);
        reg.insert(e, EntitySelectionComponent::default());
        e
    }

    fn ray_at(x: f64) -> Ray {
        Ray::new(DVec3::new(x, 0.0, 0.0), DVec3::NEG_Z)
    }

    #[test]
    fn click_toggles_selection() {
        let mut reg = Registry::new();
        let a = selectable(&mut reg, 0.0, 2.0);
        let b = selectable(&mut reg, 20.0, 2.0);
        let mut sys = SelectionSystem::new();

        let ev = sys.click(&mut reg, &ray_at(0.0));
        assert_eq!(ev, Some(SceneEvent::selection(Some(a), None)));
        assert!(reg.has::<HighlightComponent>(a));

        let ev = sys.click(&mut reg, &ray_at(20.0));
        assert_eq!(ev, Some(SceneEvent::selection(Some(b), Some(a))));
        assert!(!reg.has::<HighlightComponent>(a));
        assert!(!reg.get::<EntitySelectionComponent>(a).unwrap().is_selected);
        assert!(reg.get::<EntitySelectionComponent>(b).unwrap().is_selected);

        let ev = sys.click(&mut reg, &ray_at(20.0));
        assert_eq!(ev, Some(SceneEvent::selection(None, Some(b))));
        assert_eq!(sys.selected(), None);
        assert!(!reg.has::<HighlightComponent>(b));
    }

    #[test]
    fn miss_keeps_selection() {
        let mut reg = Registry::new();
        let a = selectable(&mut reg, 0.0, 2.0);
        let mut sys = SelectionSystem::new();
        sys.click(&mut reg, &ray_at(0.0));
        assert_eq!(sys.click(&mut reg, &ray_at(100.0)), None);
        assert_eq!(sys.selected(), Some(a));
    }

    #[test]
    fn nearest_hit_wins() {
        let mut reg = Registry::new();
        let far = selectable(&mut reg, 0.0, 2.0);
        let near = reg.spawn();
        let mut m = ModelComponent::sphere(1.0).with_position(DVec3::new(0.0, 0.0, -10.0));
        m.lifecycle = Lifecycle::Ready;
        reg.insert(near, m);
        reg.insert(near, EntitySelectionComponent::default());

        let sys = SelectionSystem::new();
        assert_eq!(sys.pick(&reg, &ray_at(0.0)), Some(near));
        assert_ne!(sys.pick(&reg, &ray_at(0.0)), Some(far));
    }

    #[test]
    fn unready_bodies_cannot_be_picked() {
        let mut reg = Registry::new();
        let e = selectable(&mut reg, 0.0, 2.0);
        reg.get_mut::<ModelComponent>(e).unwrap().lifecycle = Lifecycle::Uninitialized;
        assert_eq!(SelectionSystem::new().pick(&reg, &ray_at(0.0)), None);
    }
}
