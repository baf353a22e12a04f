pub mod camera_latch;
pub mod ccd;
pub mod model;
pub mod orbit;
pub mod render;
pub mod selection;
pub mod shadow;

pub use camera_latch::{CameraLatchComponent, LatchPhase};
pub use ccd::CcdComponent;
pub use model::ModelComponent;
pub use orbit::{LengthUnit, OrbitComponent, OrbitalElements};
pub use render::{BodyKind, RenderComponent};
pub use selection::{EntitySelectionComponent, HighlightComponent};
pub use shadow::ShadowComponent;

use serde::Serialize;

use crate::core::registry::Entity;

/// Per-component initialization state. Systems do their one-time setup on
/// the first visit and flip the component to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Ready,
}

/// Marks a moon. Holds the parent body's handle; the parent does not own the moon
/// and is looked up through the registry every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoonOf(pub Entity);
