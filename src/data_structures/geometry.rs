//! Indexed triangle geometry and procedural shape generators.
//!
//! Generators follow the usual Y-up conventions of web renderers: spheres are
//! built from latitude rings starting at the north pole, cylinders and
//! capsules stand along the Y axis centred on the origin, and planes lie in
//! the XY plane facing +Z.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use cgmath::{InnerSpace, Vector3};

/// Describes how a vertex type is laid out in a GPU buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// CPU-side indexed geometry with flat attribute buffers.
///
/// `positions` and `normals` hold 3 floats per vertex, `uvs` 2 floats per
/// vertex (or nothing when the source had no texture coordinates).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub label: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn indexed(
        label: impl Into<String>,
        positions: Vec<f32>,
        normals: Vec<f32>,
        uvs: Vec<f32>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            label: label.into(),
            positions,
            normals,
            uvs,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleave the attribute buffers for upload. Missing normals or uvs
    /// are zero-filled.
    pub fn to_vertices(&self) -> Vec<ModelVertex> {
        (0..self.vertex_count())
            .map(|i| ModelVertex {
                position: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                ],
                tex_coords: [
                    self.uvs.get(i * 2).copied().unwrap_or(0.0),
                    self.uvs.get(i * 2 + 1).copied().unwrap_or(0.0),
                ],
                normal: [
                    self.normals.get(i * 3).copied().unwrap_or(0.0),
                    self.normals.get(i * 3 + 1).copied().unwrap_or(0.0),
                    self.normals.get(i * 3 + 2).copied().unwrap_or(0.0),
                ],
            })
            .collect()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for empty geometry.
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let mut points = self.positions.chunks_exact(3);
        let first = points.next()?;
        let mut min = Vector3::new(first[0], first[1], first[2]);
        let mut max = min;
        for p in points {
            min = Vector3::new(min.x.min(p[0]), min.y.min(p[1]), min.z.min(p[2]));
            max = Vector3::new(max.x.max(p[0]), max.y.max(p[1]), max.z.max(p[2]));
        }
        Some((min, max))
    }

    fn push_vertex(&mut self, position: Vector3<f32>, normal: Vector3<f32>, uv: [f32; 2]) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[position.x, position.y, position.z]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        self.uvs.extend_from_slice(&uv);
        index
    }

    /// Connect a grid of `rows` x `cols` vertex indices into quads, skipping
    /// the triangles that would degenerate at the first or last row.
    fn stitch_rows(&mut self, grid: &[Vec<u32>], skip_first: bool, skip_last: bool) {
        let rows = grid.len();
        for iy in 0..rows.saturating_sub(1) {
            for ix in 0..grid[iy].len() - 1 {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if !(skip_first && iy == 0) {
                    self.indices.extend_from_slice(&[a, b, d]);
                }
                if !(skip_last && iy == rows - 2) {
                    self.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut geometry = Geometry {
            label: "sphere".to_string(),
            ..Default::default()
        };

        let mut grid = Vec::with_capacity(height_segments as usize + 1);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = Vector3::new(
                    -(u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                );
                row.push(geometry.push_vertex(normal * radius, normal, [u, 1.0 - v]));
            }
            grid.push(row);
        }
        geometry.stitch_rows(&grid, true, true);
        geometry
    }

    /// A closed cylinder of `height` along Y.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let slope = if height != 0.0 {
            (radius_bottom - radius_top) / height
        } else {
            0.0
        };
        let mut geometry = Geometry {
            label: "cylinder".to_string(),
            ..Default::default()
        };

        let mut grid = Vec::with_capacity(2);
        for (v, radius) in [(0.0f32, radius_top), (1.0, radius_bottom)] {
            let mut row = Vec::with_capacity(radial_segments as usize + 1);
            for x in 0..=radial_segments {
                let u = x as f32 / radial_segments as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let position = Vector3::new(radius * sin, -v * height + half_height, radius * cos);
                let normal = Vector3::new(sin, slope, cos).normalize();
                row.push(geometry.push_vertex(position, normal, [u, 1.0 - v]));
            }
            grid.push(row);
        }
        // the side wall never degenerates, so no triangles are skipped
        for x in 0..radial_segments as usize {
            let a = grid[0][x];
            let b = grid[1][x];
            let c = grid[1][x + 1];
            let d = grid[0][x + 1];
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        geometry.cap(radius_top, half_height, radial_segments, true);
        geometry.cap(radius_bottom, half_height, radial_segments, false);
        geometry
    }

    fn cap(&mut self, radius: f32, half_height: f32, radial_segments: u32, top: bool) {
        let sign = if top { 1.0 } else { -1.0 };
        let normal = Vector3::new(0.0, sign, 0.0);
        let centers: Vec<u32> = (0..radial_segments)
            .map(|_| self.push_vertex(normal * half_height, normal, [0.5, 0.5]))
            .collect();
        let rim: Vec<u32> = (0..=radial_segments)
            .map(|x| {
                let theta = x as f32 / radial_segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                let position = Vector3::new(radius * sin, half_height * sign, radius * cos);
                self.push_vertex(position, normal, [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5])
            })
            .collect();
        for x in 0..radial_segments as usize {
            let (c, i) = (centers[x], rim[x]);
            if top {
                self.indices.extend_from_slice(&[i, rim[x + 1], c]);
            } else {
                self.indices.extend_from_slice(&[rim[x + 1], i, c]);
            }
        }
    }

    /// A capsule along Y whose straight middle section has `length`; the
    /// total height is `length + 2 * radius`.
    pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> Self {
        let cap_segments = cap_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let half_length = length / 2.0;
        let mut geometry = Geometry {
            label: "capsule".to_string(),
            ..Default::default()
        };

        // latitude angles from the north pole, one equator ring per hemisphere
        let rings: Vec<(f32, f32)> = (0..=cap_segments)
            .map(|i| (FRAC_PI_2 * i as f32 / cap_segments as f32, half_length))
            .chain((0..=cap_segments).map(|i| {
                (FRAC_PI_2 + FRAC_PI_2 * i as f32 / cap_segments as f32, -half_length)
            }))
            .collect();
        let ring_count = rings.len() as f32 - 1.0;

        let mut grid = Vec::with_capacity(rings.len());
        for (ring, &(phi, offset)) in rings.iter().enumerate() {
            let v = ring as f32 / ring_count;
            let mut row = Vec::with_capacity(radial_segments as usize + 1);
            for x in 0..=radial_segments {
                let u = x as f32 / radial_segments as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let normal = Vector3::new(phi.sin() * sin, phi.cos(), phi.sin() * cos);
                let position = normal * radius + Vector3::new(0.0, offset, 0.0);
                row.push(geometry.push_vertex(position, normal, [u, 1.0 - v]));
            }
            grid.push(row);
        }
        geometry.stitch_rows(&grid, true, true);
        geometry
    }

    /// An axis-aligned box centred on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let mut geometry = Geometry {
            label: "box".to_string(),
            ..Default::default()
        };
        let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u axis, v axis) per face, counter-clockwise seen from outside
        let faces = [
            (Vector3::unit_x(), -Vector3::unit_z(), -Vector3::unit_y()),
            (-Vector3::unit_x(), Vector3::unit_z(), -Vector3::unit_y()),
            (Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
            (-Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
            (Vector3::unit_z(), Vector3::unit_x(), -Vector3::unit_y()),
            (-Vector3::unit_z(), -Vector3::unit_x(), -Vector3::unit_y()),
        ];
        for (normal, u_axis, v_axis) in faces {
            let scale = |v: Vector3<f32>| Vector3::new(v.x * half.x, v.y * half.y, v.z * half.z);
            let center = scale(normal);
            let corners = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];
            let base = geometry.vertex_count() as u32;
            for (cu, cv) in corners {
                let position = center + scale(u_axis * cu) + scale(v_axis * cv);
                let uv = [(cu + 1.0) / 2.0, 1.0 - (cv + 1.0) / 2.0];
                geometry.push_vertex(position, normal, uv);
            }
            geometry
                .indices
                .extend_from_slice(&[base, base + 2, base + 1, base + 2, base + 3, base + 1]);
        }
        geometry
    }

    /// A single quad in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut geometry = Geometry {
            label: "plane".to_string(),
            ..Default::default()
        };
        let normal = Vector3::unit_z();
        for iy in 0..=1 {
            for ix in 0..=1 {
                let position = Vector3::new(
                    ix as f32 * width - width / 2.0,
                    -(iy as f32 * height - height / 2.0),
                    0.0,
                );
                geometry.push_vertex(position, normal, [ix as f32, 1.0 - iy as f32]);
            }
        }
        geometry.indices.extend_from_slice(&[0, 2, 1, 2, 3, 1]);
        geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_range(geometry: &Geometry) {
        let count = geometry.vertex_count() as u32;
        assert!(geometry.indices.iter().all(|&i| i < count));
        assert_eq!(geometry.indices.len() % 3, 0);
        assert_eq!(geometry.normals.len(), geometry.positions.len());
        assert_eq!(geometry.uvs.len() / 2, geometry.vertex_count());
    }

    /// Every triangle's winding should agree with the stored normals.
    fn assert_outward_winding(geometry: &Geometry) {
        let p = |i: u32| {
            let i = i as usize * 3;
            Vector3::new(geometry.positions[i], geometry.positions[i + 1], geometry.positions[i + 2])
        };
        let n = |i: u32| {
            let i = i as usize * 3;
            Vector3::new(geometry.normals[i], geometry.normals[i + 1], geometry.normals[i + 2])
        };
        for tri in geometry.indices.chunks_exact(3) {
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            if face.magnitude2() < 1e-12 {
                continue;
            }
            let avg = n(tri[0]) + n(tri[1]) + n(tri[2]);
            assert!(face.dot(avg) > 0.0, "inward facing triangle {tri:?}");
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = Geometry::sphere(2.0, 8, 6);
        assert_eq!(sphere.vertex_count(), 9 * 7);
        for p in sphere.positions.chunks_exact(3) {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 2.0).abs() < 1e-5);
        }
        assert_indices_in_range(&sphere);
        assert_outward_winding(&sphere);
    }

    #[test]
    fn cylinder_spans_height() {
        let cylinder = Geometry::cylinder(0.5, 0.5, 3.0, 12);
        let (min, max) = cylinder.bounds().unwrap();
        assert!((min.y + 1.5).abs() < 1e-6 && (max.y - 1.5).abs() < 1e-6);
        assert!((max.x - 0.5).abs() < 1e-5);
        assert_indices_in_range(&cylinder);
        assert_outward_winding(&cylinder);
    }

    #[test]
    fn capsule_adds_hemispheres_to_length() {
        let capsule = Geometry::capsule(0.25, 1.0, 4, 8);
        let (min, max) = capsule.bounds().unwrap();
        assert!((max.y - 0.75).abs() < 1e-5);
        assert!((min.y + 0.75).abs() < 1e-5);
        assert_indices_in_range(&capsule);
        assert_outward_winding(&capsule);
    }

    #[test]
    fn cuboid_extents_match_dimensions() {
        let cuboid = Geometry::cuboid(2.0, 4.0, 6.0);
        assert_eq!(cuboid.vertex_count(), 24);
        assert_eq!(cuboid.triangle_count(), 12);
        let (min, max) = cuboid.bounds().unwrap();
        assert_eq!(max, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(min, Vector3::new(-1.0, -2.0, -3.0));
        assert_outward_winding(&cuboid);
    }

    #[test]
    fn plane_faces_positive_z() {
        let plane = Geometry::plane(100.0, 100.0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.bounds().unwrap().1, Vector3::new(50.0, 50.0, 0.0));
        assert_outward_winding(&plane);
    }

    #[test]
    fn interleaving_fills_missing_uvs() {
        let geometry = Geometry::indexed(
            "tri",
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            Vec::new(),
            vec![0, 1, 2],
        );
        let vertices = geometry.to_vertices();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn vertex_layout_matches_model_vertex() {
        let layout = ModelVertex::desc();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[2].offset, 20);
    }
}
