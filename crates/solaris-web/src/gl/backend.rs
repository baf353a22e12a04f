use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use log::{debug, info};
use solaris_engine::{
    uv_sphere, wire_box, AssetManifest, FrameUniforms, GpuContext, MeshKind, ProgramId,
    RenderBackend, RenderError, RenderPass, FULLSCREEN_QUAD,
};
use web_sys::{HtmlImageElement, WebGl2RenderingContext as Gl, WebGlTexture, WebGlUniformLocation};

use super::mesh::{GpuMesh, StreamBuffer};
use super::program::Program;
use super::targets::{MsaaTargets, COMPOSITE_FRAGMENT, COMPOSITE_VERTEX};

const SPHERE_STACKS: u32 = 48;
const SPHERE_SLICES: u32 = 96;

/// WebGL2 implementation of the engine's render backend.
///
/// Frames are drawn into a multisampled offscreen target, resolved into a
/// texture, and composited onto the canvas with a full-screen quad.
pub struct GlBackend {
    gl: Gl,
    programs: HashMap<ProgramId, Program>,
    composite: Program,
    current: Option<ProgramId>,
    sphere: GpuMesh,
    wire_box: GpuMesh,
    quad: GpuMesh,
    stream: StreamBuffer,
    targets: MsaaTargets,
    textures: HashMap<String, WebGlTexture>,
    frame: FrameUniforms,
}

impl GlBackend {
    pub fn new(
        gl: Gl,
        manifest: &AssetManifest,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<Self, RenderError> {
        manifest.check_scene_programs()?;
        let mut programs = HashMap::new();
        for id in ProgramId::SCENE {
            let source = manifest.program(id.name())?;
            programs.insert(id, Program::new(&gl, id.name(), &source.vertex, &source.fragment)?);
        }
        let composite = Program::new(&gl, "composite", COMPOSITE_VERTEX, COMPOSITE_FRAGMENT)?;

        let sphere = GpuMesh::triangles(&gl, &uv_sphere(SPHERE_STACKS, SPHERE_SLICES))?;
        let wire_box = GpuMesh::positions(&gl, &wire_box(), Gl::LINES)?;
        let quad = GpuMesh::fullscreen_quad(&gl, &FULLSCREEN_QUAD)?;
        let stream = StreamBuffer::new(&gl)?;
        let targets = MsaaTargets::new(&gl, width, height, samples)?;

        gl.enable(Gl::CULL_FACE);
        gl.cull_face(Gl::BACK);
        info!("webgl2 backend ready: {} programs, {width}x{height}", programs.len());

        Ok(Self {
            gl,
            programs,
            composite,
            current: None,
            sphere,
            wire_box,
            quad,
            stream,
            targets,
            textures: HashMap::new(),
            frame: FrameUniforms::default(),
        })
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Upload a decoded image under `key`, replacing any previous texture.
    pub fn upload_texture(&mut self, key: &str, image: &HtmlImageElement) -> Result<(), RenderError> {
        let gl = &self.gl;
        let texture = gl
            .create_texture()
            .ok_or(RenderError::ResourceCreation("texture"))?;
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA as i32,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            image,
        )
        .map_err(|_| RenderError::ResourceCreation("texture upload"))?;
        gl.generate_mipmap(Gl::TEXTURE_2D);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::LINEAR_MIPMAP_LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::REPEAT as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        gl.bind_texture(Gl::TEXTURE_2D, None);

        if let Some(old) = self.textures.insert(key.to_string(), texture) {
            self.gl.delete_texture(Some(&old));
        }
        debug!("texture '{key}' uploaded");
        Ok(())
    }

    fn with_uniform(&mut self, name: &str, f: impl FnOnce(&Gl, &WebGlUniformLocation)) {
        let Some(id) = self.current else {
            return;
        };
        let Some(program) = self.programs.get_mut(&id) else {
            return;
        };
        if let Some(loc) = program.uniform(&self.gl, name) {
            f(&self.gl, loc);
        }
    }

    fn upload_frame_uniforms(&mut self) {
        let frame = self.frame;
        self.set_mat4("u_view", &frame.view);
        self.set_mat4("u_projection", &frame.projection);
        self.set_vec3("u_light_position", frame.light_position);
        self.set_f32("u_time_days", frame.time_days);
    }
}

impl GpuContext for GlBackend {
    fn frame(&self) -> &FrameUniforms {
        &self.frame
    }

    fn has_texture(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }

    fn bind_texture(&mut self, key: &str, unit: u32, uniform: &str) {
        let Some(texture) = self.textures.get(key) else {
            return;
        };
        self.gl.active_texture(Gl::TEXTURE0 + unit);
        self.gl.bind_texture(Gl::TEXTURE_2D, Some(texture));
        self.with_uniform(uniform, |gl, loc| gl.uniform1i(Some(loc), unit as i32));
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        let cols = value.to_cols_array();
        self.with_uniform(name, |gl, loc| gl.uniform_matrix4fv_with_f32_array(Some(loc), false, &cols));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.with_uniform(name, |gl, loc| gl.uniform3f(Some(loc), value.x, value.y, value.z));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.with_uniform(name, |gl, loc| gl.uniform4f(Some(loc), value.x, value.y, value.z, value.w));
    }

    fn set_f32(&mut self, name: &str, value: f32) {
        self.with_uniform(name, |gl, loc| gl.uniform1f(Some(loc), value));
    }

    fn draw_mesh(&mut self, mesh: MeshKind) {
        match mesh {
            MeshKind::Sphere => self.sphere.draw(&self.gl),
            MeshKind::WireBox => self.wire_box.draw(&self.gl),
        }
    }

    fn draw_lines(&mut self, points: &[Vec3], closed: bool) {
        let mode = if closed { Gl::LINE_LOOP } else { Gl::LINE_STRIP };
        self.stream.draw(&self.gl, points, mode);
    }

    fn draw_points(&mut self, points: &[Vec3], size: f32) {
        self.set_f32("u_point_size", size);
        self.stream.draw(&self.gl, points, Gl::POINTS);
    }
}

impl RenderBackend for GlBackend {
    fn backend(&self) -> &'static str {
        "webgl2"
    }

    fn begin_frame(&mut self, frame: &FrameUniforms) -> Result<(), RenderError> {
        if self.gl.is_context_lost() {
            return Err(RenderError::ContextUnavailable);
        }
        self.frame = *frame;
        self.current = None;
        self.targets.bind(&self.gl);
        Ok(())
    }

    fn apply_pass_state(&mut self, pass: RenderPass) {
        let gl = &self.gl;
        match pass {
            RenderPass::Opaque => {
                gl.enable(Gl::DEPTH_TEST);
                gl.depth_mask(true);
                gl.disable(Gl::BLEND);
            }
            RenderPass::Transparent => {
                gl.enable(Gl::DEPTH_TEST);
                gl.depth_mask(false);
                gl.enable(Gl::BLEND);
                gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);
            }
            RenderPass::Overlay => {
                gl.disable(Gl::DEPTH_TEST);
                gl.depth_mask(false);
                gl.enable(Gl::BLEND);
                gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);
            }
        }
    }

    fn use_program(&mut self, program: ProgramId) -> bool {
        let Some(p) = self.programs.get(&program) else {
            return false;
        };
        self.gl.use_program(Some(&p.handle));
        self.current = Some(program);
        self.upload_frame_uniforms();
        true
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let gl = &self.gl;
        self.targets.resolve(gl);

        let (w, h) = self.targets.size();
        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        gl.viewport(0, 0, w as i32, h as i32);
        gl.disable(Gl::DEPTH_TEST);
        gl.disable(Gl::BLEND);
        gl.use_program(Some(&self.composite.handle));
        gl.active_texture(Gl::TEXTURE0);
        gl.bind_texture(Gl::TEXTURE_2D, self.targets.resolve_texture());
        if let Some(loc) = self.composite.uniform(gl, "u_scene") {
            gl.uniform1i(Some(loc), 0);
        }
        self.quad.draw(gl);
        gl.depth_mask(true);
        self.current = None;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.targets.resize(&self.gl, width, height)
    }
}
