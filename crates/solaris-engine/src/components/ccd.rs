use super::Lifecycle;

/// Enables camera collision handling against this body.
#[derive(Debug, Clone, Copy, Default)]
pub struct CcdComponent {
    pub lifecycle: Lifecycle,
}
