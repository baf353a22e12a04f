use serde::{Deserialize, Serialize};

use crate::renderer::traits::ProgramId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Asteroid,
}

/// How a body is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderComponent {
    pub kind: BodyKind,
    pub program: ProgramId,
    /// Texture key in the asset surface. `None` draws with `color` only.
    pub texture: Option<String>,
    pub color: [f32; 3],
}

impl RenderComponent {
    pub fn new(kind: BodyKind) -> Self {
        let program = match kind {
            BodyKind::Star => ProgramId::STAR,
            BodyKind::Asteroid => ProgramId::ASTEROID,
            BodyKind::Planet | BodyKind::Moon => ProgramId::BODY,
        };
        Self { kind, program, texture: None, color: [1.0, 1.0, 1.0] }
    }

    pub fn with_texture(mut self, key: impl Into<String>) -> Self {
        self.texture = Some(key.into());
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}
