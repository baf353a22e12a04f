use glam::{DMat4, DVec3, DVec4};

/// Six clip planes `(n, d)` with unit normals pointing inward:
/// a point `p` is inside a plane when `n·p + d ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [DVec4; 6],
}

impl Frustum {
    /// Gribb–Hartmann extraction from a GL-convention view-projection matrix.
    /// Order: left, right, bottom, top, near, far.
    pub fn from_view_projection(m: &DMat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2].map(normalize_plane);
        Self { planes }
    }

    pub fn signed_distance(plane: DVec4, point: DVec3) -> f64 {
        plane.truncate().dot(point) + plane.w
    }

    /// False only when the sphere lies entirely outside some plane.
    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        self.planes
            .iter()
            .all(|&p| Self::signed_distance(p, center) >= -radius)
    }
}

fn normalize_plane(p: DVec4) -> DVec4 {
    let len = p.truncate().length();
    if len > f64::EPSILON { p / len } else { p }
}
