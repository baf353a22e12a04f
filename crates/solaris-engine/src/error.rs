//! Errors raised while building or rendering a scene.
//!
//! Initialization failures are fatal and abort scene construction.
//! Per-frame problems (asset not loaded yet, moon without a parent) are
//! never surfaced through these types; systems skip and retry next frame.

/// GPU-side initialization and configuration failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("WebGL2 context unavailable")]
    ContextUnavailable,

    #[error("shader compile failed for program '{program}': {log}")]
    ShaderCompile { program: String, log: String },

    #[error("program link failed for '{program}': {log}")]
    ProgramLink { program: String, log: String },

    #[error("no shader source registered for program '{0}'")]
    MissingProgram(String),

    #[error("framebuffer incomplete after {stage} (status 0x{status:04x})")]
    IncompleteFramebuffer { stage: &'static str, status: u32 },

    #[error("failed to create GPU resource: {0}")]
    ResourceCreation(&'static str),
}

/// Orbital elements that cannot describe a closed Keplerian orbit.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum OrbitError {
    #[error("eccentricity {0} outside [0, 1)")]
    Eccentricity(f64),

    #[error("period {0} days must be positive")]
    Period(f64),

    #[error("semi-major axis {0} must be positive")]
    SemiMajorAxis(f64),
}

/// Engine-level errors: configuration, body construction, rendering setup.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid orbit for '{body}': {reason}")]
    InvalidOrbit {
        body: String,
        #[source]
        reason: OrbitError,
    },

    #[error("body '{body}' references unknown parent '{parent}'")]
    UnknownParent { body: String, parent: String },

    #[error("duplicate entity name '{0}'")]
    DuplicateName(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}
