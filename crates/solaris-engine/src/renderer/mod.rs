pub mod camera;
pub mod commands;
pub mod mesh;
pub mod pipeline;
pub mod queue;
pub mod traits;

// Re-export key types for convenient access
pub use camera::{Camera, LatchOrbit};
pub use commands::{BodyDraw, BoundsDraw, PointCloudDraw, ShadowUniforms, TrailDraw};
pub use mesh::{uv_sphere, wire_box, MeshData, MeshVertex, FULLSCREEN_QUAD};
pub use pipeline::Renderer;
pub use queue::{CommandHandle, QueuedCommand, RenderQueue};
pub use traits::{
    DrawCommand, FlushStats, FrameUniforms, GpuContext, MeshKind, ProgramId, RenderBackend,
    RenderPass,
};
