use std::collections::HashSet;

/// Logical keys the camera understands. Physical layout is mapped through
/// `KeyboardEvent.code`, so WASD stays in place on non-QWERTY layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    Boost,
    /// Release selection and latch.
    Escape,
}

impl Key {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "KeyW" | "ArrowUp" => Key::Forward,
            "KeyS" | "ArrowDown" => Key::Back,
            "KeyA" | "ArrowLeft" => Key::Left,
            "KeyD" | "ArrowRight" => Key::Right,
            "KeyE" | "Space" => Key::Up,
            "KeyQ" | "ControlLeft" => Key::Down,
            "ShiftLeft" | "ShiftRight" => Key::Boost,
            "Escape" => Key::Escape,
            _ => return None,
        })
    }
}

/// Mouse buttons, matching `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

impl MouseButton {
    pub fn from_index(button: i16) -> Self {
        match button {
            1 => MouseButton::Middle,
            2 => MouseButton::Secondary,
            _ => MouseButton::Primary,
        }
    }
}

/// Input event types the engine understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key },
    KeyUp { key: Key },
    /// Relative mouse movement in pixels.
    MouseMove { dx: f64, dy: f64 },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    /// Wheel delta, positive away from the user.
    Wheel { delta: f64 },
    /// Click at canvas pixel coordinates, used for picking.
    Click { x: f64, y: f64 },
    /// Canvas resized to CSS pixels.
    Resize { width: u32, height: u32 },
    PointerLock { locked: bool },
}

/// A queue of input events.
/// Browser listeners push into the queue; the scene drains it each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    held: HashSet<Key>,
}

impl KeySet {
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Apply a key event; other events are ignored.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown { key } => self.press(key),
            InputEvent::KeyUp { key } => self.release(key),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Click { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyDown { key: Key::Forward });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn key_codes_map_to_keys() {
        assert_eq!(Key::from_code("KeyW"), Some(Key::Forward));
        assert_eq!(Key::from_code("ShiftRight"), Some(Key::Boost));
        assert_eq!(Key::from_code("KeyZ"), None);
        assert_eq!(MouseButton::from_index(2), MouseButton::Secondary);
    }

    #[test]
    fn key_set_tracks_membership() {
        let mut keys = KeySet::default();
        keys.apply(&InputEvent::KeyDown { key: Key::Left });
        keys.apply(&InputEvent::KeyDown { key: Key::Boost });
        keys.apply(&InputEvent::KeyUp { key: Key::Left });
        assert!(!keys.is_down(Key::Left));
        assert!(keys.is_down(Key::Boost));
        keys.clear();
        assert!(!keys.is_down(Key::Boost));
    }
}
