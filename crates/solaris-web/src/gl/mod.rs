//! WebGL2 implementation of the engine's render backend.

pub mod backend;
pub mod mesh;
pub mod program;
pub mod targets;

pub use backend::GlBackend;
