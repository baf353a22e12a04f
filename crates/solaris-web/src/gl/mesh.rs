use glam::Vec3;
use solaris_engine::{MeshData, MeshVertex, RenderError};
use web_sys::{WebGl2RenderingContext as Gl, WebGlBuffer, WebGlVertexArrayObject};

/// A static mesh resident on the GPU.
pub struct GpuMesh {
    vao: WebGlVertexArrayObject,
    count: i32,
    mode: u32,
    indexed: bool,
}

impl GpuMesh {
    /// Indexed triangles with position, normal and uv at slots 0, 1, 2.
    pub fn triangles(gl: &Gl, mesh: &MeshData) -> Result<Self, RenderError> {
        let vao = gl
            .create_vertex_array()
            .ok_or(RenderError::ResourceCreation("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let vbo = create_buffer(gl)?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vbo));
        gl.buffer_data_with_u8_array(
            Gl::ARRAY_BUFFER,
            bytemuck::cast_slice(&mesh.vertices),
            Gl::STATIC_DRAW,
        );
        let stride = MeshVertex::STRIDE_BYTES as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 3, Gl::FLOAT, false, stride, MeshVertex::NORMAL_OFFSET as i32);
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_with_i32(2, 2, Gl::FLOAT, false, stride, MeshVertex::UV_OFFSET as i32);

        let ibo = create_buffer(gl)?;
        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&ibo));
        gl.buffer_data_with_u8_array(
            Gl::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&mesh.indices),
            Gl::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);
        Ok(Self {
            vao,
            count: mesh.indices.len() as i32,
            mode: Gl::TRIANGLES,
            indexed: true,
        })
    }

    /// Non-indexed positions at slot 0.
    pub fn positions(gl: &Gl, positions: &[[f32; 3]], mode: u32) -> Result<Self, RenderError> {
        Self::with_components(gl, bytemuck::cast_slice(positions), 3, positions.len() as i32, mode)
    }

    /// Clip-space quad (xy + uv) at slots 0 and 2, drawn as a triangle strip.
    pub fn fullscreen_quad(gl: &Gl, quad: &[[f32; 4]; 4]) -> Result<Self, RenderError> {
        let vao = gl
            .create_vertex_array()
            .ok_or(RenderError::ResourceCreation("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let vbo = create_buffer(gl)?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vbo));
        gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytemuck::cast_slice(&quad[..]), Gl::STATIC_DRAW);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 2, Gl::FLOAT, false, 16, 0);
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_with_i32(2, 2, Gl::FLOAT, false, 16, 8);
        gl.bind_vertex_array(None);
        Ok(Self { vao, count: 4, mode: Gl::TRIANGLE_STRIP, indexed: false })
    }

    fn with_components(gl: &Gl, bytes: &[u8], components: i32, count: i32, mode: u32) -> Result<Self, RenderError> {
        let vao = gl
            .create_vertex_array()
            .ok_or(RenderError::ResourceCreation("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let vbo = create_buffer(gl)?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vbo));
        gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytes, Gl::STATIC_DRAW);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, components, Gl::FLOAT, false, components * 4, 0);
        gl.bind_vertex_array(None);
        Ok(Self { vao, count, mode, indexed: false })
    }

    pub fn draw(&self, gl: &Gl) {
        gl.bind_vertex_array(Some(&self.vao));
        if self.indexed {
            gl.draw_elements_with_i32(self.mode, self.count, Gl::UNSIGNED_INT, 0);
        } else {
            gl.draw_arrays(self.mode, 0, self.count);
        }
        gl.bind_vertex_array(None);
    }
}

/// Streaming vertex buffer for per-frame polylines and point clouds.
/// Grows to the largest upload seen and is reused afterwards.
pub struct StreamBuffer {
    vao: WebGlVertexArrayObject,
    vbo: WebGlBuffer,
    capacity: usize,
}

impl StreamBuffer {
    pub fn new(gl: &Gl) -> Result<Self, RenderError> {
        let vao = gl
            .create_vertex_array()
            .ok_or(RenderError::ResourceCreation("vertex array"))?;
        let vbo = create_buffer(gl)?;
        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vbo));
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, 12, 0);
        gl.bind_vertex_array(None);
        Ok(Self { vao, vbo, capacity: 0 })
    }

    pub fn draw(&mut self, gl: &Gl, points: &[Vec3], mode: u32) {
        if points.is_empty() {
            return;
        }
        let bytes: &[u8] = bytemuck::cast_slice(points);
        gl.bind_vertex_array(Some(&self.vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&self.vbo));
        if bytes.len() > self.capacity {
            gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytes, Gl::STREAM_DRAW);
            self.capacity = bytes.len();
        } else {
            gl.buffer_sub_data_with_i32_and_u8_array(Gl::ARRAY_BUFFER, 0, bytes);
        }
        gl.draw_arrays(mode, 0, points.len() as i32);
        gl.bind_vertex_array(None);
    }
}

fn create_buffer(gl: &Gl) -> Result<WebGlBuffer, RenderError> {
    gl.create_buffer().ok_or(RenderError::ResourceCreation("buffer"))
}
