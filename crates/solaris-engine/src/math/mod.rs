pub mod easing;
pub mod frustum;
pub mod ray;

pub use easing::{lerp, smoothstep, Easing};
pub use frustum::Frustum;
pub use ray::Ray;
