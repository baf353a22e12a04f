// math/easing.rs
//
// Scalar easing and interpolation used by the camera transitions.

/// Easing curve applied to a normalized progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// `t²(3 - 2t)`: zero velocity at both ends.
    #[default]
    Smoothstep,
}

impl Easing {
    /// Apply the curve. Input is clamped to [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }
}

pub fn smoothstep(t: f64) -> f64 {
    Easing::Smoothstep.apply(t)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
