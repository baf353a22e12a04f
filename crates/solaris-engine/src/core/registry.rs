use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::components::{
    CameraLatchComponent, CcdComponent, EntitySelectionComponent, HighlightComponent,
    ModelComponent, MoonOf, OrbitComponent, RenderComponent, ShadowComponent,
};
use crate::error::EngineError;

/// Opaque entity handle. The generation guards against stale handles:
/// once an index is recycled, handles carrying the old generation resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Slot index, stable for the entity's lifetime. Used as the id exposed to the UI.
    pub fn id(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Every component kind the registry can store. The set is closed:
/// each kind has exactly one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Model,
    Orbit,
    Moon,
    CameraLatch,
    Selection,
    Ccd,
    Render,
    Highlight,
    Shadow,
}

/// Dense per-kind storage indexed by entity slot.
#[derive(Debug)]
pub struct Column<T> {
    slots: Vec<Option<T>>,
}

impl<T> Column<T> {
    fn new() -> Self {
        Self { slots: Vec::new() }
    }

    fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize).and_then(|s| s.as_ref())
    }

    fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize).and_then(|s| s.as_mut())
    }

    fn insert(&mut self, index: u32, value: T) -> Option<T> {
        let i = index as usize;
        if self.slots.len() <= i {
            self.slots.resize_with(i + 1, || None);
        }
        self.slots[i].replace(value)
    }

    fn remove(&mut self, index: u32) -> Option<T> {
        self.slots.get_mut(index as usize).and_then(|s| s.take())
    }

    fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|c| (i as u32, c)))
    }
}

/// Binds a component type to its column in the registry.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;
    fn column(registry: &Registry) -> &Column<Self>;
    fn column_mut(registry: &mut Registry) -> &mut Column<Self>;
}

macro_rules! impl_component {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn column(registry: &Registry) -> &Column<Self> {
                &registry.$field
            }

            fn column_mut(registry: &mut Registry) -> &mut Column<Self> {
                &mut registry.$field
            }
        }
    };
}

impl_component!(ModelComponent, Model, models);
impl_component!(OrbitComponent, Orbit, orbits);
impl_component!(MoonOf, Moon, moons);
impl_component!(CameraLatchComponent, CameraLatch, latches);
impl_component!(EntitySelectionComponent, Selection, selections);
impl_component!(CcdComponent, Ccd, ccds);
impl_component!(RenderComponent, Render, renders);
impl_component!(HighlightComponent, Highlight, highlights);
impl_component!(ShadowComponent, Shadow, shadows);

/// Entity/component store. Storage and query only; behaviour lives in systems.
#[derive(Debug)]
pub struct Registry {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    names: HashMap<u32, String>,
    by_name: HashMap<String, Entity>,

    models: Column<ModelComponent>,
    orbits: Column<OrbitComponent>,
    moons: Column<MoonOf>,
    latches: Column<CameraLatchComponent>,
    selections: Column<EntitySelectionComponent>,
    ccds: Column<CcdComponent>,
    renders: Column<RenderComponent>,
    highlights: Column<HighlightComponent>,
    shadows: Column<ShadowComponent>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            generations: Vec::with_capacity(64),
            alive: Vec::with_capacity(64),
            free: Vec::new(),
            names: HashMap::new(),
            by_name: HashMap::new(),
            models: Column::new(),
            orbits: Column::new(),
            moons: Column::new(),
            latches: Column::new(),
            selections: Column::new(),
            ccds: Column::new(),
            renders: Column::new(),
            highlights: Column::new(),
            shadows: Column::new(),
        }
    }

    /// Allocate a new entity, recycling a freed slot when one is available.
    pub fn spawn(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            let i = index as usize;
            self.alive[i] = true;
            Entity { index, generation: self.generations[i] }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            Entity { index, generation: 0 }
        }
    }

    /// Remove an entity with all of its components and its name.
    /// Returns false for stale or unknown handles.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }
        let index = entity.index;
        self.models.remove(index);
        self.orbits.remove(index);
        self.moons.remove(index);
        self.latches.remove(index);
        self.selections.remove(index);
        self.ccds.remove(index);
        self.renders.remove(index);
        self.highlights.remove(index);
        self.shadows.remove(index);
        if let Some(name) = self.names.remove(&index) {
            self.by_name.remove(&name);
        }

        let i = index as usize;
        self.alive[i] = false;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push(index);
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        let i = entity.index as usize;
        i < self.alive.len() && self.alive[i] && self.generations[i] == entity.generation
    }

    /// Resolve a UI-facing id back to the live entity in that slot.
    pub fn entity_at(&self, id: u32) -> Option<Entity> {
        let i = id as usize;
        if i < self.alive.len() && self.alive[i] {
            Some(Entity { index: id, generation: self.generations[i] })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive.iter().enumerate().filter(|(_, &a)| a).map(|(i, _)| Entity {
            index: i as u32,
            generation: self.generations[i],
        })
    }

    // -- Components --

    /// Attach a component, replacing any previous one of the same kind.
    /// Returns false (and drops the component) when the entity is not alive.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        if !self.contains(entity) {
            return false;
        }
        T::column_mut(self).insert(entity.index, component);
        true
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.contains(entity) {
            return None;
        }
        T::column(self).get(entity.index)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.contains(entity) {
            return None;
        }
        T::column_mut(self).get_mut(entity.index)
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }
        T::column_mut(self).remove(entity.index)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Iterate `(entity, component)` pairs for one kind, in slot order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        T::column(self).iter().map(|(index, c)| {
            (Entity { index, generation: self.generations[index as usize] }, c)
        })
    }

    /// Snapshot of the entities carrying a component kind.
    /// Collected so callers can mutate the registry while walking it.
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.iter::<T>().map(|(e, _)| e).collect()
    }

    /// Component kinds currently attached to an entity.
    pub fn kinds_of(&self, entity: Entity) -> Vec<ComponentKind> {
        if !self.contains(entity) {
            return Vec::new();
        }
        let i = entity.index;
        [
            (self.models.get(i).is_some(), ComponentKind::Model),
            (self.orbits.get(i).is_some(), ComponentKind::Orbit),
            (self.moons.get(i).is_some(), ComponentKind::Moon),
            (self.latches.get(i).is_some(), ComponentKind::CameraLatch),
            (self.selections.get(i).is_some(), ComponentKind::Selection),
            (self.ccds.get(i).is_some(), ComponentKind::Ccd),
            (self.renders.get(i).is_some(), ComponentKind::Render),
            (self.highlights.get(i).is_some(), ComponentKind::Highlight),
            (self.shadows.get(i).is_some(), ComponentKind::Shadow),
        ]
        .into_iter()
        .filter_map(|(present, kind)| present.then_some(kind))
        .collect()
    }

    /// The one readiness predicate: the body has a model and it is READY.
    pub fn is_ready(&self, entity: Entity) -> bool {
        self.get::<ModelComponent>(entity).is_some_and(|m| m.is_ready())
    }

    // -- Names --

    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> Result<(), EngineError> {
        let name = name.into();
        if let Some(&owner) = self.by_name.get(&name) {
            if owner != entity {
                return Err(EngineError::DuplicateName(name));
            }
        }
        if !self.contains(entity) {
            return Ok(());
        }
        if let Some(old) = self.names.insert(entity.index, name.clone()) {
            self.by_name.remove(&old);
        }
        self.by_name.insert(name, entity);
        Ok(())
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        if !self.contains(entity) {
            return None;
        }
        self.names.get(&entity.index).map(String::as_str)
    }

    pub fn find(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied().filter(|&e| self.contains(e))
    }

    /// id → display name for every named entity.
    pub fn names(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.names.iter().map(|(&id, name)| (id, name.as_str()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
