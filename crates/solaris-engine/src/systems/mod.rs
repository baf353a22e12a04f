pub mod camera_latch;
pub mod ccd;
pub mod culling;
pub mod model;
pub mod orbit;
pub mod render;
pub mod selection;
pub mod shadow;

pub use camera_latch::CameraLatchSystem;
pub use ccd::CcdSystem;
pub use culling::cull_bodies;
pub use model::update_models;
pub use orbit::OrbitSystem;
pub use render::RenderSystems;
pub use selection::SelectionSystem;
pub use shadow::{light_space_matrix, star_position, ShadowSystem};
