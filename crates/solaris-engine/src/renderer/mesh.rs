use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex for lit, textured meshes.
/// 8 floats = 32 bytes stride: position, normal, uv.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
    pub const NORMAL_OFFSET: usize = 3 * 4;
    pub const UV_OFFSET: usize = 6 * 4;
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Unit UV sphere, Y up. The seam column is duplicated so texture
/// coordinates wrap cleanly.
pub fn uv_sphere(stacks: u32, slices: u32) -> MeshData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = v * PI;
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let theta = u * TAU;
            let n = [phi.sin() * theta.cos(), phi.cos(), -phi.sin() * theta.sin()];
            vertices.push(MeshVertex { position: n, normal: n, uv: [u, v] });
        }
    }

    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    MeshData { vertices, indices }
}

/// Edges of the cube [-1, 1]³ as a line list (24 vertices).
pub fn wire_box() -> Vec<[f32; 3]> {
    let c = |i: u32| -> [f32; 3] {
        [
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        ]
    };
    let mut lines = Vec::with_capacity(24);
    for i in 0..8u32 {
        for bit in [1u32, 2, 4] {
            if i & bit == 0 {
                lines.push(c(i));
                lines.push(c(i | bit));
            }
        }
    }
    lines
}

/// Full-screen quad in clip space as a triangle strip, with texture coordinates.
pub const FULLSCREEN_QUAD: [[f32; 4]; 4] = [
    [-1.0, -1.0, 0.0, 0.0],
    [1.0, -1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let mesh = uv_sphere(16, 32);
        assert_eq!(mesh.vertices.len(), 17 * 33);
        assert_eq!(mesh.indices.len(), 16 * 32 * 6);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            let len = (x * x + y * y + z * z).sqrt();
            assert!((len - 1.0).abs() < 1e-5, "len = {len}");
        }
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertices.len());
    }

    #[test]
    fn sphere_winding_faces_outward() {
        let mesh = uv_sphere(8, 8);
        // A triangle from the second band: its normal must agree with the vertex normal.
        let tri = &mesh.indices[8 * 6..8 * 6 + 3];
        let p = |i: u32| glam::Vec3::from(mesh.vertices[i as usize].position);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        let n = (b - a).cross(c - a);
        assert!(n.dot(a + b + c) > 0.0);
    }

    #[test]
    fn wire_box_has_twelve_edges() {
        let lines = wire_box();
        assert_eq!(lines.len(), 24);
        for pair in lines.chunks(2) {
            let diff = (0..3).filter(|&k| pair[0][k] != pair[1][k]).count();
            assert_eq!(diff, 1);
        }
    }

    #[test]
    fn vertex_stride() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), MeshVertex::STRIDE_BYTES);
    }
}
