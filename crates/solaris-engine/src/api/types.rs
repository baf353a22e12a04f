use serde::Serialize;

use crate::components::LatchPhase;
use crate::core::registry::Entity;

/// Notifications emitted by the scene for the UI layer, drained once per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneEvent {
    /// Selection set changed. Either side may be empty.
    SelectionChanged {
        selected: Option<u32>,
        deselected: Option<u32>,
    },
    /// The latch state machine entered a new phase.
    LatchPhaseChanged { entity: u32, phase: LatchPhase },
    /// The latch was released and the camera is back in free-look.
    LatchReleased { entity: u32 },
    /// Simulation calendar date changed (`YYYY-MM-DD`).
    DateChanged { date: String },
}

impl SceneEvent {
    pub fn selection(selected: Option<Entity>, deselected: Option<Entity>) -> Self {
        Self::SelectionChanged {
            selected: selected.map(Entity::id),
            deselected: deselected.map(Entity::id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&SceneEvent::LatchPhaseChanged {
            entity: 4,
            phase: LatchPhase::Latched,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"latch_phase_changed","entity":4,"phase":"Latched"}"#);
    }
}
