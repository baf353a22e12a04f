pub mod manifest;
pub mod source;

pub use manifest::{AssetManifest, ShaderSource};
pub use source::{AssetSource, LoadTracker};
