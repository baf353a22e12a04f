use log::debug;

use super::queue::{CommandHandle, QueuedCommand, RenderQueue};
use super::traits::{FlushStats, FrameUniforms, RenderBackend};
use crate::error::RenderError;

/// Owns the render queue and the drawing-buffer size; drives a backend once per frame.
pub struct Renderer {
    queue: RenderQueue,
    viewport: (u32, u32),
    last_stats: FlushStats,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            queue: RenderQueue::new(),
            viewport: (width, height),
            last_stats: FlushStats::default(),
        }
    }

    pub fn enqueue(&mut self, command: QueuedCommand) -> CommandHandle {
        self.queue.enqueue(command)
    }

    pub fn remove(&mut self, handle: CommandHandle) -> bool {
        self.queue.remove(handle)
    }

    /// Drop commands queued for a frame that was never flushed.
    pub fn clear_transient(&mut self) {
        self.queue.clear_transient();
    }

    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn last_stats(&self) -> FlushStats {
        self.last_stats
    }

    /// Resize size-dependent backend targets. Zero-sized and unchanged
    /// sizes are ignored.
    pub fn resize<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if width == 0 || height == 0 || (width, height) == self.viewport {
            return Ok(());
        }
        backend.resize(width, height)?;
        self.viewport = (width, height);
        Ok(())
    }

    pub fn flush<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        frame: &FrameUniforms,
    ) -> Result<FlushStats, RenderError> {
        let stats = self.queue.flush(backend, frame)?;
        if stats != self.last_stats {
            debug!(
                "[{}] executed {} skipped {} programs {}",
                backend.backend(),
                stats.executed,
                stats.skipped,
                stats.program_switches
            );
        }
        self.last_stats = stats;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingBackend;

    #[test]
    fn resize_skips_zero_and_unchanged() {
        let mut renderer = Renderer::new(800, 600);
        let mut backend = RecordingBackend::default();
        renderer.resize(&mut backend, 0, 600).unwrap();
        renderer.resize(&mut backend, 800, 600).unwrap();
        assert_eq!(backend.size, (0, 0));
        renderer.resize(&mut backend, 1024, 768).unwrap();
        assert_eq!(backend.size, (1024, 768));
        assert_eq!(renderer.viewport(), (1024, 768));
    }
}
