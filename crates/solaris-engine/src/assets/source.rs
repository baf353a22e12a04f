use std::collections::HashSet;

/// Read-only view of asset availability. Never blocks: a texture that has
/// not arrived yet is simply reported as unavailable.
pub trait AssetSource {
    fn has_texture(&self, key: &str) -> bool;
    /// Fraction of expected assets loaded, in [0, 1].
    fn progress(&self) -> f32;
}

/// Tracks which of an expected set of textures have been loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    expected: HashSet<String>,
    loaded: HashSet<String>,
}

impl LoadTracker {
    pub fn new<I, S>(expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected: expected.into_iter().map(Into::into).collect(),
            loaded: HashSet::new(),
        }
    }

    /// Record a loaded texture. Unexpected keys are accepted too.
    pub fn mark_loaded(&mut self, key: impl Into<String>) {
        self.loaded.insert(key.into());
    }

    pub fn is_complete(&self) -> bool {
        self.expected.iter().all(|k| self.loaded.contains(k))
    }
}

impl AssetSource for LoadTracker {
    fn has_texture(&self, key: &str) -> bool {
        self.loaded.contains(key)
    }

    fn progress(&self) -> f32 {
        if self.expected.is_empty() {
            return 1.0;
        }
        let done = self.expected.iter().filter(|k| self.loaded.contains(*k)).count();
        done as f32 / self.expected.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_counts_expected_only() {
        let mut tracker = LoadTracker::new(["earth", "moon"]);
        assert_eq!(tracker.progress(), 0.0);
        tracker.mark_loaded("stars");
        assert_eq!(tracker.progress(), 0.0);
        tracker.mark_loaded("earth");
        assert_eq!(tracker.progress(), 0.5);
        assert!(tracker.has_texture("earth"));
        assert!(!tracker.has_texture("moon"));
        tracker.mark_loaded("moon");
        assert!(tracker.is_complete());
        assert_eq!(tracker.progress(), 1.0);
    }

    #[test]
    fn nothing_expected_is_complete() {
        assert_eq!(LoadTracker::default().progress(), 1.0);
    }
}
