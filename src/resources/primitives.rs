//! Procedural geometry for the castle scene.
//!
//! Every shape in the scene comes out of this module: boxes for walls and
//! battlements, cylinders and cones for the towers, planes for ground and
//! windows, and the rounded-rectangle ring that forms the moat. Generators
//! produce CPU-side [`MeshData`] so shape properties can be tested without a
//! GPU; [`MeshData::into_mesh`] uploads the buffers.

use std::f32::consts::TAU;

use crate::data_structures::model::{Mesh, ModelVertex};

/// CPU-side mesh: vertices plus triangle indices.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Append a mirrored copy of every triangle with reversed winding and
    /// negated normals, so the mesh is visible from both sides under
    /// back-face culling.
    pub fn double_sided(mut self) -> Self {
        let base = self.vertices.len() as u32;
        let backs: Vec<ModelVertex> = self
            .vertices
            .iter()
            .map(|v| ModelVertex {
                position: v.position,
                tex_coords: v.tex_coords,
                normal: [-v.normal[0], -v.normal[1], -v.normal[2]],
            })
            .collect();
        let back_indices: Vec<u32> = self
            .indices
            .chunks(3)
            .flat_map(|tri| [tri[2] + base, tri[1] + base, tri[0] + base])
            .collect();
        self.vertices.extend(backs);
        self.indices.extend(back_indices);
        self
    }

    /// Upload to GPU buffers.
    pub fn into_mesh(
        self,
        device: &wgpu::Device,
        name: &str,
        material: usize,
        casts_shadow: bool,
        receives_shadow: bool,
    ) -> Mesh {
        Mesh::new(
            device,
            name,
            &self.vertices,
            &self.indices,
            material,
            casts_shadow,
            receives_shadow,
        )
    }

    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], uv_scale: f32) {
        let base = self.vertices.len() as u32;
        let uvs = [
            [0.0, 0.0],
            [uv_scale, 0.0],
            [uv_scale, uv_scale],
            [0.0, uv_scale],
        ];
        for (position, tex_coords) in corners.into_iter().zip(uvs) {
            self.vertices.push(ModelVertex {
                position,
                tex_coords,
                normal,
            });
        }
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// A flat plane in the XZ plane facing +Y, centered at the origin.
pub fn plane(width: f32, depth: f32, uv_scale: f32) -> MeshData {
    let hw = width / 2.0;
    let hd = depth / 2.0;
    let mut data = MeshData::default();
    data.push_quad(
        [
            [-hw, 0.0, -hd],
            [-hw, 0.0, hd],
            [hw, 0.0, hd],
            [hw, 0.0, -hd],
        ],
        [0.0, 1.0, 0.0],
        uv_scale,
    );
    data
}

/// An upright quad in the XY plane facing +Z (used for the windows).
pub fn quad(width: f32, height: f32, uv_scale: f32) -> MeshData {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let mut data = MeshData::default();
    data.push_quad(
        [
            [-hw, -hh, 0.0],
            [hw, -hh, 0.0],
            [hw, hh, 0.0],
            [-hw, hh, 0.0],
        ],
        [0.0, 0.0, 1.0],
        uv_scale,
    );
    data
}

/// An axis-aligned box centered at the origin, with per-face normals.
pub fn cuboid(width: f32, height: f32, depth: f32, uv_scale: f32) -> MeshData {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let hd = depth / 2.0;
    let mut data = MeshData::default();
    // front +Z
    data.push_quad(
        [
            [-hw, -hh, hd],
            [hw, -hh, hd],
            [hw, hh, hd],
            [-hw, hh, hd],
        ],
        [0.0, 0.0, 1.0],
        uv_scale,
    );
    // back -Z
    data.push_quad(
        [
            [hw, -hh, -hd],
            [-hw, -hh, -hd],
            [-hw, hh, -hd],
            [hw, hh, -hd],
        ],
        [0.0, 0.0, -1.0],
        uv_scale,
    );
    // right +X
    data.push_quad(
        [
            [hw, -hh, hd],
            [hw, -hh, -hd],
            [hw, hh, -hd],
            [hw, hh, hd],
        ],
        [1.0, 0.0, 0.0],
        uv_scale,
    );
    // left -X
    data.push_quad(
        [
            [-hw, -hh, -hd],
            [-hw, -hh, hd],
            [-hw, hh, hd],
            [-hw, hh, -hd],
        ],
        [-1.0, 0.0, 0.0],
        uv_scale,
    );
    // top +Y
    data.push_quad(
        [
            [-hw, hh, hd],
            [hw, hh, hd],
            [hw, hh, -hd],
            [-hw, hh, -hd],
        ],
        [0.0, 1.0, 0.0],
        uv_scale,
    );
    // bottom -Y
    data.push_quad(
        [
            [-hw, -hh, -hd],
            [hw, -hh, -hd],
            [hw, -hh, hd],
            [-hw, -hh, hd],
        ],
        [0.0, -1.0, 0.0],
        uv_scale,
    );
    data
}

/// An upright cylinder centered at the origin with closed caps.
pub fn cylinder(radius: f32, height: f32, segments: usize, uv_scale: f32) -> MeshData {
    let hh = height / 2.0;
    let mut data = MeshData::default();

    // Side: a duplicated seam vertex keeps the texture coordinates continuous.
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let u = i as f32 / segments as f32 * uv_scale;
        data.vertices.push(ModelVertex {
            position: [cos * radius, -hh, sin * radius],
            tex_coords: [u, uv_scale],
            normal: [cos, 0.0, sin],
        });
        data.vertices.push(ModelVertex {
            position: [cos * radius, hh, sin * radius],
            tex_coords: [u, 0.0],
            normal: [cos, 0.0, sin],
        });
    }
    for i in 0..segments as u32 {
        let (bottom, top) = (2 * i, 2 * i + 1);
        let (next_bottom, next_top) = (2 * i + 2, 2 * i + 3);
        data.indices.extend([bottom, top, next_top]);
        data.indices.extend([bottom, next_top, next_bottom]);
    }

    for (y, normal) in [(hh, [0.0, 1.0, 0.0]), (-hh, [0.0, -1.0, 0.0])] {
        let center = data.vertices.len() as u32;
        data.vertices.push(ModelVertex {
            position: [0.0, y, 0.0],
            tex_coords: [uv_scale / 2.0, uv_scale / 2.0],
            normal,
        });
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            data.vertices.push(ModelVertex {
                position: [cos * radius, y, sin * radius],
                tex_coords: [
                    (cos * 0.5 + 0.5) * uv_scale,
                    (sin * 0.5 + 0.5) * uv_scale,
                ],
                normal,
            });
        }
        for i in 0..segments as u32 {
            let (ring, next_ring) = (center + 1 + i, center + 2 + i);
            if y > 0.0 {
                data.indices.extend([center, next_ring, ring]);
            } else {
                data.indices.extend([center, ring, next_ring]);
            }
        }
    }

    data
}

/// An upright cone (apex up) centered at the origin with a closed base.
pub fn cone(radius: f32, height: f32, segments: usize, uv_scale: f32) -> MeshData {
    let hh = height / 2.0;
    let mut data = MeshData::default();

    // Slanted side. Each segment gets its own apex vertex so the normal can
    // follow the surface around the cone.
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let normal = normalize([cos * height, radius, sin * height]);
        let u = i as f32 / segments as f32 * uv_scale;
        data.vertices.push(ModelVertex {
            position: [cos * radius, -hh, sin * radius],
            tex_coords: [u, uv_scale],
            normal,
        });
        data.vertices.push(ModelVertex {
            position: [0.0, hh, 0.0],
            tex_coords: [u, 0.0],
            normal,
        });
    }
    for i in 0..segments as u32 {
        let (base, apex, next_base) = (2 * i, 2 * i + 1, 2 * i + 2);
        data.indices.extend([base, apex, next_base]);
    }

    // Base cap.
    let center = data.vertices.len() as u32;
    data.vertices.push(ModelVertex {
        position: [0.0, -hh, 0.0],
        tex_coords: [uv_scale / 2.0, uv_scale / 2.0],
        normal: [0.0, -1.0, 0.0],
    });
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        data.vertices.push(ModelVertex {
            position: [cos * radius, -hh, sin * radius],
            tex_coords: [
                (cos * 0.5 + 0.5) * uv_scale,
                (sin * 0.5 + 0.5) * uv_scale,
            ],
            normal: [0.0, -1.0, 0.0],
        });
    }
    for i in 0..segments as u32 {
        let (ring, next_ring) = (center + 1 + i, center + 2 + i);
        data.indices.extend([center, ring, next_ring]);
    }

    data
}

/// The closed outline of a square with quarter-circle corners, centered at
/// the origin with half-extent `half` and corner radius `radius`.
///
/// The first point is repeated at the end so the loop is explicitly closed.
pub fn rounded_rect_outline(half: f32, radius: f32, segments: usize) -> Vec<[f32; 2]> {
    let c = half - radius;
    // Corner centers with the start angle of each quarter arc, walking the
    // outline counterclockwise from the bottom edge.
    let corners = [
        ([c, -c], -90.0_f32),
        ([c, c], 0.0),
        ([-c, c], 90.0),
        ([-c, -c], 180.0),
    ];

    let mut points = Vec::with_capacity(4 * (segments + 1) + 1);
    for ([cx, cy], start) in corners {
        for s in 0..=segments {
            let angle = (start + 90.0 * s as f32 / segments as f32).to_radians();
            let (sin, cos) = angle.sin_cos();
            points.push([cx + cos * radius, cy + sin * radius]);
        }
    }
    points.push(points[0]);
    points
}

/// An annular flat mesh in the XZ plane facing +Y: the area between an outer
/// and an inner rounded rectangle (the moat).
///
/// Both outlines use the same corner treatment, so their point counts match
/// and the band between them triangulates as a strip.
pub fn rounded_rect_ring(
    outer_half: f32,
    inner_half: f32,
    radius: f32,
    segments: usize,
    uv_scale: f32,
) -> MeshData {
    let outer = rounded_rect_outline(outer_half, radius, segments);
    let inner = rounded_rect_outline(inner_half, radius, segments);

    let mut data = MeshData::default();
    let count = outer.len();
    for i in 0..count {
        let u = i as f32 / (count - 1) as f32 * uv_scale;
        data.vertices.push(ModelVertex {
            position: [outer[i][0], 0.0, outer[i][1]],
            tex_coords: [u, 0.0],
            normal: [0.0, 1.0, 0.0],
        });
        data.vertices.push(ModelVertex {
            position: [inner[i][0], 0.0, inner[i][1]],
            tex_coords: [u, 1.0],
            normal: [0.0, 1.0, 0.0],
        });
    }
    for i in 0..(count - 1) as u32 {
        let (outer_i, inner_i) = (2 * i, 2 * i + 1);
        let (outer_next, inner_next) = (2 * i + 2, 2 * i + 3);
        data.indices.extend([outer_i, inner_i, outer_next]);
        data.indices.extend([inner_i, inner_next, outer_next]);
    }
    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_norm(p: &[f32; 2]) -> f32 {
        p[0].abs().max(p[1].abs())
    }

    fn assert_indices_in_range(data: &MeshData) {
        let len = data.vertices.len() as u32;
        assert!(data.indices.iter().all(|&i| i < len));
        assert_eq!(data.indices.len() % 3, 0);
    }

    #[test]
    fn plane_is_a_single_up_facing_quad() {
        let data = plane(100.0, 100.0, 10.0);
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.indices.len(), 6);
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(
            data.vertices
                .iter()
                .any(|v| v.tex_coords == [10.0, 10.0])
        );
    }

    #[test]
    fn cuboid_has_six_faces_within_bounds() {
        let data = cuboid(20.0, 5.0, 0.5, 2.0);
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.indices.len(), 36);
        assert_indices_in_range(&data);
        for v in &data.vertices {
            assert!(v.position[0].abs() <= 10.0);
            assert!(v.position[1].abs() <= 2.5);
            assert!(v.position[2].abs() <= 0.25);
        }
    }

    #[test]
    fn cylinder_and_cone_triangulate_cleanly() {
        let cyl = cylinder(2.0, 12.0, 32, 2.0);
        assert_indices_in_range(&cyl);
        // side quads + two caps
        assert_eq!(cyl.indices.len(), (32 * 6 + 2 * 32 * 3) as usize);

        let cone = cone(2.5, 4.0, 32, 4.0);
        assert_indices_in_range(&cone);
        assert_eq!(cone.indices.len(), (32 * 3 + 32 * 3) as usize);
    }

    #[test]
    fn rounded_outline_is_a_closed_loop() {
        let outline = rounded_rect_outline(13.0, 2.0, 8);
        assert_eq!(outline.len(), 4 * 9 + 1);
        assert_eq!(outline.first(), outline.last());
        // Stays inside the bounding square and reaches the straight edges.
        assert!(outline.iter().all(|p| max_norm(p) <= 13.0 + 1e-5));
        assert!(outline.iter().any(|p| (max_norm(p) - 13.0).abs() < 1e-5));
    }

    #[test]
    fn moat_inner_loop_is_strictly_inside_outer_loop() {
        // The configured moat: castle size 20, moat width 3, corner radius 2.
        let outer = rounded_rect_outline(13.0, 2.0, 8);
        let inner = rounded_rect_outline(10.0, 2.0, 8);
        assert_eq!(outer.first(), outer.last());
        assert_eq!(inner.first(), inner.last());
        let inner_max = inner.iter().map(max_norm).fold(0.0_f32, f32::max);
        let outer_min = outer.iter().map(max_norm).fold(f32::MAX, f32::min);
        assert!(inner_max <= 10.0 + 1e-5);
        assert!(outer_min >= 11.0 - 1e-5);
        assert!(inner_max < outer_min);
    }

    #[test]
    fn ring_strip_connects_matching_outlines() {
        let data = rounded_rect_ring(13.0, 10.0, 2.0, 8, 8.0);
        assert_indices_in_range(&data);
        let loop_len = 4 * 9 + 1;
        assert_eq!(data.vertices.len(), 2 * loop_len);
        assert_eq!(data.indices.len(), (loop_len - 1) * 6);
    }

    #[test]
    fn double_sided_mirrors_triangles_and_normals() {
        let single = quad(1.0, 1.5, 1.0);
        let double = quad(1.0, 1.5, 1.0).double_sided();
        assert_eq!(double.vertices.len(), single.vertices.len() * 2);
        assert_eq!(double.indices.len(), single.indices.len() * 2);
        assert!(double.vertices[4..].iter().all(|v| v.normal == [0.0, 0.0, -1.0]));
    }
}
