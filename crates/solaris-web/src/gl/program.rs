use std::collections::HashMap;

use solaris_engine::RenderError;
use web_sys::{WebGl2RenderingContext as Gl, WebGlProgram, WebGlShader, WebGlUniformLocation};

/// A linked program with a lazily filled uniform-location cache.
pub struct Program {
    pub handle: WebGlProgram,
    uniforms: HashMap<String, Option<WebGlUniformLocation>>,
}

impl Program {
    pub fn new(gl: &Gl, name: &str, vertex: &str, fragment: &str) -> Result<Self, RenderError> {
        let vs = compile(gl, name, Gl::VERTEX_SHADER, vertex)?;
        let fs = compile(gl, name, Gl::FRAGMENT_SHADER, fragment)?;
        let handle = link(gl, name, &vs, &fs)?;
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));
        Ok(Self { handle, uniforms: HashMap::new() })
    }

    /// Uniform location, `None` when the program does not declare it
    /// (or the driver optimized it away).
    pub fn uniform(&mut self, gl: &Gl, name: &str) -> Option<&WebGlUniformLocation> {
        if !self.uniforms.contains_key(name) {
            let loc = gl.get_uniform_location(&self.handle, name);
            self.uniforms.insert(name.to_string(), loc);
        }
        self.uniforms.get(name).and_then(Option::as_ref)
    }
}

fn compile(gl: &Gl, program: &str, kind: u32, source: &str) -> Result<WebGlShader, RenderError> {
    let shader = gl
        .create_shader(kind)
        .ok_or(RenderError::ResourceCreation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(RenderError::ShaderCompile { program: program.to_string(), log })
    }
}

fn link(gl: &Gl, program: &str, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, RenderError> {
    let handle = gl
        .create_program()
        .ok_or(RenderError::ResourceCreation("program"))?;
    gl.attach_shader(&handle, vs);
    gl.attach_shader(&handle, fs);
    // Fixed attribute slots shared by every mesh layout.
    gl.bind_attrib_location(&handle, 0, "a_position");
    gl.bind_attrib_location(&handle, 1, "a_normal");
    gl.bind_attrib_location(&handle, 2, "a_uv");
    gl.link_program(&handle);

    let ok = gl
        .get_program_parameter(&handle, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(handle)
    } else {
        let log = gl.get_program_info_log(&handle).unwrap_or_default();
        gl.delete_program(Some(&handle));
        Err(RenderError::ProgramLink { program: program.to_string(), log })
    }
}
