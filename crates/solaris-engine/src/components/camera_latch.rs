use glam::{DQuat, DVec3};
use serde::Serialize;

/// Camera latch state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LatchPhase {
    /// Rotating in place to face the target.
    Reorienting,
    /// Flying toward the latch distance.
    Transitioning,
    /// Orbit controls active.
    Latched,
}

/// Attached to the body the camera is currently latched to (or moving toward).
/// At most one entity carries it at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLatchComponent {
    pub phase: LatchPhase,
    pub elapsed: f64,
    /// Degrees, mirrored from the camera once latched.
    pub azimuth: f64,
    pub elevation: f64,
    pub start_position: DVec3,
    pub start_orientation: DQuat,
    /// Camera offset from the target when translation began.
    pub start_offset: DVec3,
}

impl CameraLatchComponent {
    pub fn new(start_position: DVec3, start_orientation: DQuat) -> Self {
        Self {
            phase: LatchPhase::Reorienting,
            elapsed: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            start_position,
            start_orientation,
            start_offset: DVec3::ZERO,
        }
    }
}
