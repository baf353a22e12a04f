pub mod anomaly;
pub mod epoch;

#[cfg(test)]
mod proptest_orbit;

pub use anomaly::{
    ecliptic_to_scene, kepler_to_cartesian, mean_anomaly_at_time, orbit_normal, sample_orbit,
    solve_kepler, true_anomaly_at_time,
};
pub use epoch::{calculate_epoch_time, days_to_date, julian_date_from_unix_ms, J2000_JD};
