//! Backend contract for the render queue.
//!
//! The engine never talks to a graphics API directly. Draw commands are
//! written against [`GpuContext`]; the queue drives a [`RenderBackend`]
//! through begin → passes → end. The WebGL2 implementation lives in the
//! web crate; tests use a recording backend.

use std::fmt;

use glam::{DVec3, Mat4, Vec3, Vec4};

use crate::error::RenderError;

/// Name of a linked shader program. The backend resolves it against the
/// shader manifest at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub &'static str);

impl ProgramId {
    pub const BODY: ProgramId = ProgramId("body");
    pub const STAR: ProgramId = ProgramId("star");
    pub const TRAIL: ProgramId = ProgramId("trail");
    pub const BOUNDS: ProgramId = ProgramId("bounds");
    pub const ASTEROID: ProgramId = ProgramId("asteroid");
    pub const DUST: ProgramId = ProgramId("dust");

    /// Programs the scene draws with. A backend must provide all of them.
    pub const SCENE: [ProgramId; 6] = [
        Self::BODY,
        Self::STAR,
        Self::TRAIL,
        Self::BOUNDS,
        Self::ASTEROID,
        Self::DUST,
    ];

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Priority bucket. Passes execute in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderPass {
    /// Depth test and write, no blending.
    Opaque,
    /// Blending on, depth writes off.
    Transparent,
    /// Depth test off, drawn over everything.
    Overlay,
}

impl RenderPass {
    pub const ALL: [RenderPass; 3] = [RenderPass::Opaque, RenderPass::Transparent, RenderPass::Overlay];
}

/// Static meshes every backend uploads once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit UV sphere with normals and texture coordinates.
    Sphere,
    /// Edges of the unit cube [-1, 1]³ as a line list.
    WireBox,
}

/// Per-frame constants shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameUniforms {
    /// View matrix with the camera at the origin.
    pub view: Mat4,
    pub projection: Mat4,
    /// World-space camera position. Commands subtract it from their
    /// world positions before narrowing to f32.
    pub camera_position: DVec3,
    /// Light (star) position, camera-relative.
    pub light_position: Vec3,
    /// Simulation time in days, for shader animation.
    pub time_days: f32,
}

impl FrameUniforms {
    /// World position → camera-relative f32.
    pub fn relative(&self, world: DVec3) -> Vec3 {
        (world - self.camera_position).as_vec3()
    }
}

/// Operations a draw command may perform. The active program is already
/// bound when a command runs.
pub trait GpuContext {
    fn frame(&self) -> &FrameUniforms;
    fn has_texture(&self, key: &str) -> bool;
    fn bind_texture(&mut self, key: &str, unit: u32, uniform: &str);
    fn set_mat4(&mut self, name: &str, value: &Mat4);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_vec4(&mut self, name: &str, value: Vec4);
    fn set_f32(&mut self, name: &str, value: f32);
    fn draw_mesh(&mut self, mesh: MeshKind);
    /// Camera-relative polyline. `closed` joins the last point to the first.
    fn draw_lines(&mut self, points: &[Vec3], closed: bool);
    /// Camera-relative point sprites.
    fn draw_points(&mut self, points: &[Vec3], size: f32);
}

/// Frame-level control of a graphics backend.
///
/// `begin_frame` binds the multisampled offscreen target and clears it;
/// `end_frame` resolves it to a single-sample texture and composites that
/// texture onto the default framebuffer.
pub trait RenderBackend: GpuContext {
    fn backend(&self) -> &'static str;
    fn begin_frame(&mut self, frame: &FrameUniforms) -> Result<(), RenderError>;
    fn apply_pass_state(&mut self, pass: RenderPass);
    /// Bind a program. Returns false when it is unknown to the backend.
    fn use_program(&mut self, program: ProgramId) -> bool;
    fn end_frame(&mut self) -> Result<(), RenderError>;
    /// Recreate size-dependent targets. Drawing-buffer pixels.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;
}

/// A unit of drawing work queued for a frame.
pub trait DrawCommand {
    /// Whether the command can run this frame (e.g. its texture is loaded).
    /// A command that fails validation is skipped, not dropped.
    fn validate(&self, _gpu: &dyn GpuContext) -> bool {
        true
    }

    fn execute(&self, gpu: &mut dyn GpuContext);

    /// Short label for logs.
    fn label(&self) -> &str {
        "draw"
    }
}

/// Counters from one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub executed: u32,
    pub skipped: u32,
    pub program_switches: u32,
}
