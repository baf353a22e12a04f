use log::debug;

use super::traits::{DrawCommand, FlushStats, FrameUniforms, ProgramId, RenderBackend, RenderPass};
use crate::error::RenderError;

/// A draw command with its routing: which program, which pass, and
/// whether it survives the flush.
pub struct QueuedCommand {
    pub program: ProgramId,
    pub pass: RenderPass,
    /// Persistent commands stay queued across frames until removed by handle.
    pub persistent: bool,
    pub command: Box<dyn DrawCommand>,
}

impl QueuedCommand {
    pub fn new(program: ProgramId, pass: RenderPass, command: impl DrawCommand + 'static) -> Self {
        Self { program, pass, persistent: false, command: Box::new(command) }
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// Identifies a queued command for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandHandle(u64);

struct Entry {
    handle: CommandHandle,
    queued: QueuedCommand,
}

/// Commands collected during `update`, executed by `flush`.
pub struct RenderQueue {
    entries: Vec<Entry>,
    next_handle: u64,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self { entries: Vec::with_capacity(256), next_handle: 0 }
    }

    pub fn enqueue(&mut self, queued: QueuedCommand) -> CommandHandle {
        let handle = CommandHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry { handle, queued });
        handle
    }

    /// Remove a command by handle. Returns false if it is no longer queued.
    pub fn remove(&mut self, handle: CommandHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn contains(&self, handle: CommandHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn persistent_len(&self) -> usize {
        self.entries.iter().filter(|e| e.queued.persistent).count()
    }

    /// Drop every non-persistent command.
    pub fn clear_transient(&mut self) {
        self.entries.retain(|e| e.queued.persistent);
    }

    /// Commands of one pass grouped by program, groups in order of the
    /// program's first appearance, commands in enqueue order within a group.
    pub fn batches(&self, pass: RenderPass) -> Vec<(ProgramId, Vec<usize>)> {
        let mut groups: Vec<(ProgramId, Vec<usize>)> = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.queued.pass != pass {
                continue;
            }
            match groups.iter_mut().find(|(p, _)| *p == entry.queued.program) {
                Some((_, indices)) => indices.push(i),
                None => groups.push((entry.queued.program, vec![i])),
            }
        }
        groups
    }

    /// Execute the queue against a backend, then discard transient commands.
    pub fn flush<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        frame: &FrameUniforms,
    ) -> Result<FlushStats, RenderError> {
        let result = self.execute(backend, frame);
        self.clear_transient();
        result
    }

    fn execute<B: RenderBackend>(
        &self,
        backend: &mut B,
        frame: &FrameUniforms,
    ) -> Result<FlushStats, RenderError> {
        let mut stats = FlushStats::default();
        backend.begin_frame(frame)?;

        for pass in RenderPass::ALL {
            let groups = self.batches(pass);
            if groups.is_empty() {
                continue;
            }
            backend.apply_pass_state(pass);
            for (program, indices) in groups {
                if !backend.use_program(program) {
                    debug!("program '{program}' unavailable, skipping {} commands", indices.len());
                    stats.skipped += indices.len() as u32;
                    continue;
                }
                stats.program_switches += 1;
                for i in indices {
                    let command = &self.entries[i].queued.command;
                    if command.validate(&*backend) {
                        command.execute(backend);
                        stats.executed += 1;
                    } else {
                        debug!("skipping '{}' this frame", command.label());
                        stats.skipped += 1;
                    }
                }
            }
        }

        backend.end_frame()?;
        Ok(stats)
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::traits::GpuContext;
    use crate::test_utils::RecordingBackend;

    struct Tag(&'static str);

    impl DrawCommand for Tag {
        fn execute(&self, gpu: &mut dyn GpuContext) {
            gpu.set_f32(self.0, 0.0);
        }
    }

    struct NeedsTexture(&'static str);

    impl DrawCommand for NeedsTexture {
        fn validate(&self, gpu: &dyn GpuContext) -> bool {
            gpu.has_texture(self.0)
        }

        fn execute(&self, gpu: &mut dyn GpuContext) {
            gpu.set_f32(self.0, 1.0);
        }
    }

    fn cmd(program: ProgramId, pass: RenderPass, tag: &'static str) -> QueuedCommand {
        QueuedCommand::new(program, pass, Tag(tag))
    }

    #[test]
    fn passes_run_in_priority_order() {
        let mut queue = RenderQueue::new();
        queue.enqueue(cmd(ProgramId::BOUNDS, RenderPass::Overlay, "overlay"));
        queue.enqueue(cmd(ProgramId::TRAIL, RenderPass::Transparent, "trail"));
        queue.enqueue(cmd(ProgramId::BODY, RenderPass::Opaque, "body"));

        let mut backend = RecordingBackend::default();
        queue.flush(&mut backend, &FrameUniforms::default()).unwrap();

        assert_eq!(
            backend.log,
            vec![
                "begin",
                "pass:Opaque", "program:body", "f32:body",
                "pass:Transparent", "program:trail", "f32:trail",
                "pass:Overlay", "program:bounds", "f32:overlay",
                "end",
            ]
        );
    }

    #[test]
    fn commands_grouped_by_first_appearance_of_program() {
        let mut queue = RenderQueue::new();
        queue.enqueue(cmd(ProgramId::STAR, RenderPass::Opaque, "sun"));
        queue.enqueue(cmd(ProgramId::BODY, RenderPass::Opaque, "earth"));
        queue.enqueue(cmd(ProgramId::STAR, RenderPass::Opaque, "other-star"));
        queue.enqueue(cmd(ProgramId::BODY, RenderPass::Opaque, "mars"));

        let mut backend = RecordingBackend::default();
        let stats = queue.flush(&mut backend, &FrameUniforms::default()).unwrap();

        assert_eq!(stats.program_switches, 2);
        assert_eq!(stats.executed, 4);
        assert_eq!(
            backend.log,
            vec![
                "begin", "pass:Opaque",
                "program:star", "f32:sun", "f32:other-star",
                "program:body", "f32:earth", "f32:mars",
                "end",
            ]
        );
    }

    #[test]
    fn transient_commands_are_dropped_after_flush() {
        let mut queue = RenderQueue::new();
        let trail = queue.enqueue(cmd(ProgramId::TRAIL, RenderPass::Transparent, "trail").persistent());
        queue.enqueue(cmd(ProgramId::BODY, RenderPass::Opaque, "body"));

        let mut backend = RecordingBackend::default();
        queue.flush(&mut backend, &FrameUniforms::default()).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(trail));

        backend.log.clear();
        queue.flush(&mut backend, &FrameUniforms::default()).unwrap();
        assert!(backend.log.contains(&"f32:trail".to_string()));
        assert!(!backend.log.contains(&"f32:body".to_string()));

        assert!(queue.remove(trail));
        assert!(!queue.remove(trail));
        assert!(queue.is_empty());
    }

    #[test]
    fn failed_validation_skips_for_one_frame_only() {
        let mut queue = RenderQueue::new();
        queue.enqueue(
            QueuedCommand::new(ProgramId::BODY, RenderPass::Opaque, NeedsTexture("earth")).persistent(),
        );

        let mut backend = RecordingBackend::default();
        let stats = queue.flush(&mut backend, &FrameUniforms::default()).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.executed, 0);

        backend.textures.insert("earth".into());
        let stats = queue.flush(&mut backend, &FrameUniforms::default()).unwrap();
        assert_eq!(stats.executed, 1);
    }

    #[test]
    fn unknown_program_skips_its_group() {
        let mut queue = RenderQueue::new();
        queue.enqueue(cmd(ProgramId::DUST, RenderPass::Transparent, "dust"));
        queue.enqueue(cmd(ProgramId::TRAIL, RenderPass::Transparent, "trail"));

        let mut backend = RecordingBackend::default();
        backend.missing_programs.insert(ProgramId::DUST);
        let stats = queue.flush(&mut backend, &FrameUniforms::default()).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.executed, 1);
        assert!(!backend.log.contains(&"f32:dust".to_string()));
    }

    #[test]
    fn empty_queue_still_begins_and_ends_frame() {
        let mut queue = RenderQueue::new();
        let mut backend = RecordingBackend::default();
        queue.flush(&mut backend, &FrameUniforms::default()).unwrap();
        assert_eq!(backend.log, vec!["begin", "end"]);
    }

    #[test]
    fn begin_failure_still_clears_transient() {
        let mut queue = RenderQueue::new();
        queue.enqueue(cmd(ProgramId::BODY, RenderPass::Opaque, "body"));
        let mut backend = RecordingBackend::default();
        backend.fail_begin = true;
        assert!(queue.flush(&mut backend, &FrameUniforms::default()).is_err());
        assert!(queue.is_empty());
    }
}
