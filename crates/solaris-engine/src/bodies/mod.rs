pub mod asteroids;
pub mod catalog;
pub mod factory;

pub use asteroids::{generate_asteroid_belt, generate_dust_cloud};
pub use catalog::{catalog_from_json, solar_system, BodyConfig, OrbitConfig, AU_KM};
pub use factory::{spawn_body, spawn_catalog};
