pub mod registry;
pub mod scene;
pub mod time;
