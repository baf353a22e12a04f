use super::Lifecycle;

/// Marks a body as pickable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySelectionComponent {
    pub is_selected: bool,
    pub lifecycle: Lifecycle,
}

/// Present exactly while the body is selected; render systems draw the
/// orbit highlight for every entity carrying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightComponent {
    pub color: [f32; 3],
}

impl Default for HighlightComponent {
    fn default() -> Self {
        Self { color: [1.0, 0.85, 0.3] }
    }
}
