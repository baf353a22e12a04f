use log::info;
use solaris_engine::RenderError;
use web_sys::{WebGl2RenderingContext as Gl, WebGlFramebuffer, WebGlRenderbuffer, WebGlTexture};

/// Composites the resolved scene texture onto the default framebuffer.
pub const COMPOSITE_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec2 a_position;
layout(location = 2) in vec2 a_uv;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

pub const COMPOSITE_FRAGMENT: &str = r#"#version 300 es
precision highp float;
uniform sampler2D u_scene;
in vec2 v_uv;
out vec4 o_color;
void main() {
    o_color = vec4(texture(u_scene, v_uv).rgb, 1.0);
}
"#;

/// Multisampled color + depth renderbuffers and the single-sample texture
/// they resolve into. Always recreated together.
pub struct MsaaTargets {
    msaa_fbo: WebGlFramebuffer,
    resolve_fbo: WebGlFramebuffer,
    color: Option<WebGlRenderbuffer>,
    depth: Option<WebGlRenderbuffer>,
    resolve: Option<WebGlTexture>,
    samples: i32,
    width: i32,
    height: i32,
}

impl MsaaTargets {
    pub fn new(gl: &Gl, width: u32, height: u32, requested_samples: u32) -> Result<Self, RenderError> {
        let max = gl
            .get_parameter(Gl::MAX_SAMPLES)
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0) as i32;
        let samples = (requested_samples as i32).clamp(1, max.max(1));
        info!("MSAA: {samples}x (max {max})");

        let mut targets = Self {
            msaa_fbo: gl
                .create_framebuffer()
                .ok_or(RenderError::ResourceCreation("msaa framebuffer"))?,
            resolve_fbo: gl
                .create_framebuffer()
                .ok_or(RenderError::ResourceCreation("resolve framebuffer"))?,
            color: None,
            depth: None,
            resolve: None,
            samples,
            width: 0,
            height: 0,
        };
        targets.resize(gl, width, height)?;
        Ok(targets)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    pub fn resolve_texture(&self) -> Option<&WebGlTexture> {
        self.resolve.as_ref()
    }

    /// Drop and recreate every size-dependent attachment.
    pub fn resize(&mut self, gl: &Gl, width: u32, height: u32) -> Result<(), RenderError> {
        let (w, h) = (width.max(1) as i32, height.max(1) as i32);
        self.release(gl);

        let color = gl
            .create_renderbuffer()
            .ok_or(RenderError::ResourceCreation("msaa color renderbuffer"))?;
        gl.bind_renderbuffer(Gl::RENDERBUFFER, Some(&color));
        gl.renderbuffer_storage_multisample(Gl::RENDERBUFFER, self.samples, Gl::RGBA8, w, h);

        let depth = gl
            .create_renderbuffer()
            .ok_or(RenderError::ResourceCreation("msaa depth renderbuffer"))?;
        gl.bind_renderbuffer(Gl::RENDERBUFFER, Some(&depth));
        gl.renderbuffer_storage_multisample(Gl::RENDERBUFFER, self.samples, Gl::DEPTH_COMPONENT24, w, h);
        gl.bind_renderbuffer(Gl::RENDERBUFFER, None);

        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&self.msaa_fbo));
        gl.framebuffer_renderbuffer(Gl::FRAMEBUFFER, Gl::COLOR_ATTACHMENT0, Gl::RENDERBUFFER, Some(&color));
        check_framebuffer(gl, "msaa color")?;
        gl.framebuffer_renderbuffer(Gl::FRAMEBUFFER, Gl::DEPTH_ATTACHMENT, Gl::RENDERBUFFER, Some(&depth));
        check_framebuffer(gl, "msaa depth")?;

        let resolve = gl
            .create_texture()
            .ok_or(RenderError::ResourceCreation("resolve texture"))?;
        gl.bind_texture(Gl::TEXTURE_2D, Some(&resolve));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA8 as i32,
            w,
            h,
            0,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            None,
        )
        .map_err(|_| RenderError::ResourceCreation("resolve texture storage"))?;
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        gl.bind_texture(Gl::TEXTURE_2D, None);

        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&self.resolve_fbo));
        gl.framebuffer_texture_2d(Gl::FRAMEBUFFER, Gl::COLOR_ATTACHMENT0, Gl::TEXTURE_2D, Some(&resolve), 0);
        check_framebuffer(gl, "resolve")?;
        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);

        self.color = Some(color);
        self.depth = Some(depth);
        self.resolve = Some(resolve);
        self.width = w;
        self.height = h;
        Ok(())
    }

    /// Bind the multisampled target for drawing and clear it.
    pub fn bind(&self, gl: &Gl) {
        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&self.msaa_fbo));
        gl.viewport(0, 0, self.width, self.height);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.depth_mask(true);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    /// Blit-resolve the multisampled color into the resolve texture.
    pub fn resolve(&self, gl: &Gl) {
        gl.bind_framebuffer(Gl::READ_FRAMEBUFFER, Some(&self.msaa_fbo));
        gl.bind_framebuffer(Gl::DRAW_FRAMEBUFFER, Some(&self.resolve_fbo));
        gl.blit_framebuffer(
            0,
            0,
            self.width,
            self.height,
            0,
            0,
            self.width,
            self.height,
            Gl::COLOR_BUFFER_BIT,
            Gl::NEAREST,
        );
        gl.bind_framebuffer(Gl::READ_FRAMEBUFFER, None);
        gl.bind_framebuffer(Gl::DRAW_FRAMEBUFFER, None);
    }

    fn release(&mut self, gl: &Gl) {
        if let Some(rb) = self.color.take() {
            gl.delete_renderbuffer(Some(&rb));
        }
        if let Some(rb) = self.depth.take() {
            gl.delete_renderbuffer(Some(&rb));
        }
        if let Some(tex) = self.resolve.take() {
            gl.delete_texture(Some(&tex));
        }
    }
}

/// Fails unless the bound framebuffer is complete.
pub fn check_framebuffer(gl: &Gl, stage: &'static str) -> Result<(), RenderError> {
    let status = gl.check_framebuffer_status(Gl::FRAMEBUFFER);
    if status == Gl::FRAMEBUFFER_COMPLETE {
        Ok(())
    } else {
        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        Err(RenderError::IncompleteFramebuffer { stage, status })
    }
}
