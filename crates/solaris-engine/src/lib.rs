pub mod api;
pub mod assets;
pub mod bodies;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod math;
pub mod orbit;
pub mod renderer;
pub mod systems;

#[cfg(test)]
mod test_utils;

// Re-export key types at crate root for convenience
pub use api::config::{ScaleFactors, SceneConfig, Settings};
pub use api::types::SceneEvent;
pub use assets::{AssetManifest, AssetSource, LoadTracker, ShaderSource};
pub use bodies::{solar_system, BodyConfig};
pub use components::{BodyKind, LatchPhase};
pub use core::registry::{Entity, Registry};
pub use core::scene::Scene;
pub use core::time::SimulationClock;
pub use error::{EngineError, OrbitError, RenderError};
pub use input::queue::{InputEvent, InputQueue, Key, KeySet, MouseButton};
pub use renderer::camera::Camera;
pub use renderer::mesh::{uv_sphere, wire_box, MeshData, MeshVertex, FULLSCREEN_QUAD};
pub use renderer::traits::{
    DrawCommand, FlushStats, FrameUniforms, GpuContext, MeshKind, ProgramId, RenderBackend,
    RenderPass,
};
