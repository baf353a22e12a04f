use crate::api::config::Settings;
use crate::orbit::epoch::{julian_date_from_unix_ms, J2000_JD};

/// Converts real frame time into simulated time.
/// Clamps long frames (tab switches, breakpoints) so the simulation never jumps.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Julian date at simulation day 0.
    start_jd: f64,
    /// Longest real frame accepted, in seconds.
    max_frame: f64,
    /// Real seconds since the clock started, excluding clamped time.
    real_elapsed: f64,
}

impl SimulationClock {
    pub const DEFAULT_MAX_FRAME: f64 = 0.25;

    pub fn new(start_unix_ms: Option<f64>) -> Self {
        Self {
            start_jd: start_unix_ms.map_or(J2000_JD, julian_date_from_unix_ms),
            max_frame: Self::DEFAULT_MAX_FRAME,
            real_elapsed: 0.0,
        }
    }

    pub fn start_jd(&self) -> f64 {
        self.start_jd
    }

    /// Clamp a real frame delta. Negative and non-finite deltas count as zero.
    pub fn frame_dt(&self, dt: f64) -> f64 {
        if dt.is_finite() { dt.clamp(0.0, self.max_frame) } else { 0.0 }
    }

    /// Record a frame. Returns `(real_dt, sim_seconds)`.
    pub fn tick(&mut self, dt: f64, settings: &Settings) -> (f64, f64) {
        let real = self.frame_dt(dt);
        self.real_elapsed += real;
        (real, settings.sim_seconds(real))
    }

    pub fn real_elapsed(&self) -> f64 {
        self.real_elapsed
    }
}
