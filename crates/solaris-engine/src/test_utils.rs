//! Test doubles shared by the engine's unit tests.

use std::collections::HashSet;

use glam::{Mat4, Vec3, Vec4};

use crate::error::RenderError;
use crate::renderer::traits::{FrameUniforms, GpuContext, MeshKind, ProgramId, RenderBackend, RenderPass};

/// Backend that records every call as a short string instead of drawing.
#[derive(Default)]
pub struct RecordingBackend {
    pub log: Vec<String>,
    pub textures: HashSet<String>,
    pub missing_programs: HashSet<ProgramId>,
    pub fail_begin: bool,
    pub frame: FrameUniforms,
    pub size: (u32, u32),
    /// Last value passed to `set_mat4`, by uniform name.
    pub mat4s: Vec<(String, Mat4)>,
}

impl RecordingBackend {
    pub fn count(&self, entry: &str) -> usize {
        self.log.iter().filter(|l| l.as_str() == entry).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.log.iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl GpuContext for RecordingBackend {
    fn frame(&self) -> &FrameUniforms {
        &self.frame
    }

    fn has_texture(&self, key: &str) -> bool {
        self.textures.contains(key)
    }

    fn bind_texture(&mut self, key: &str, unit: u32, _uniform: &str) {
        self.log.push(format!("texture:{key}@{unit}"));
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.mat4s.push((name.to_string(), *value));
    }

    fn set_vec3(&mut self, _name: &str, _value: Vec3) {}

    fn set_vec4(&mut self, _name: &str, _value: Vec4) {}

    fn set_f32(&mut self, name: &str, _value: f32) {
        self.log.push(format!("f32:{name}"));
    }

    fn draw_mesh(&mut self, mesh: MeshKind) {
        self.log.push(format!("mesh:{mesh:?}"));
    }

    fn draw_lines(&mut self, points: &[Vec3], closed: bool) {
        self.log.push(format!("lines:{}:{closed}", points.len()));
    }

    fn draw_points(&mut self, points: &[Vec3], _size: f32) {
        self.log.push(format!("points:{}", points.len()));
    }
}

impl RenderBackend for RecordingBackend {
    fn backend(&self) -> &'static str {
        "recording"
    }

    fn begin_frame(&mut self, frame: &FrameUniforms) -> Result<(), RenderError> {
        if self.fail_begin {
            return Err(RenderError::ResourceCreation("offscreen target"));
        }
        self.frame = *frame;
        self.log.push("begin".into());
        Ok(())
    }

    fn apply_pass_state(&mut self, pass: RenderPass) {
        self.log.push(format!("pass:{pass:?}"));
    }

    fn use_program(&mut self, program: ProgramId) -> bool {
        if self.missing_programs.contains(&program) {
            return false;
        }
        self.log.push(format!("program:{program}"));
        true
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.log.push("end".into());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.size = (width, height);
        Ok(())
    }
}
