//! CPU-side mesh data and primitive generation.
//!
//! Primitives are Y-up and centered on the origin unless noted. They back the
//! placeholder geometry used while real models load, and the static decorations.

use crate::vertex::Vertex;
use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

/// Mesh data before upload to any renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Horizontal plane in XZ facing +Y, split into `segments`² quads.
    pub fn grid(width: f32, depth: f32, segments: u32) -> Self {
        let segments = segments.max(1);
        let mut mesh = Self::new();
        for row in 0..=segments {
            let v = row as f32 / segments as f32;
            for col in 0..=segments {
                let u = col as f32 / segments as f32;
                mesh.vertices.push(Vertex::new(
                    [(u - 0.5) * width, 0.0, (v - 0.5) * depth],
                    [0.0, 1.0, 0.0],
                    [u, v],
                ));
            }
        }
        let stride = segments + 1;
        for row in 0..segments {
            for col in 0..segments {
                let a = row * stride + col;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        mesh
    }

    /// Single-quad horizontal plane.
    pub fn plane(width: f32, depth: f32) -> Self {
        Self::grid(width, depth, 1)
    }

    /// Box with the given half extents.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
        ];

        let mut mesh = Self::new();
        for (normal, u_axis, v_axis) in faces {
            let base = mesh.vertices.len() as u32;
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (su, sv) in corners {
                let p = (normal + u_axis * su + v_axis * sv) * h;
                mesh.vertices.push(Vertex::new(
                    p.into(),
                    normal.into(),
                    [(su + 1.0) * 0.5, (1.0 - sv) * 0.5],
                ));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    /// UV sphere.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut mesh = Self::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let normal = Vec3::new(x, y, z).normalize_or_zero();
                let uv = [
                    segment as f32 / segments as f32,
                    ring as f32 / rings as f32,
                ];

                mesh.vertices.push(Vertex::new([x, y, z], normal.into(), uv));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                mesh.indices.push(current);
                mesh.indices.push(next);
                mesh.indices.push(current + 1);

                mesh.indices.push(current + 1);
                mesh.indices.push(next);
                mesh.indices.push(next + 1);
            }
        }

        mesh
    }

    /// Capped cylinder (or cone when `radius_top` is zero) of total `height`.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);
        let mut mesh = Self::new();

        // Side wall
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            let u = segment as f32 / segments as f32;
            mesh.vertices.push(Vertex::new(
                [radius_top * sin, half, radius_top * cos],
                normal.into(),
                [u, 0.0],
            ));
            mesh.vertices.push(Vertex::new(
                [radius_bottom * sin, -half, radius_bottom * cos],
                normal.into(),
                [u, 1.0],
            ));
        }
        for segment in 0..segments {
            let a = segment * 2;
            mesh.indices.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
        }

        // Caps
        for (radius, y, normal) in [(radius_top, half, 1.0f32), (radius_bottom, -half, -1.0)] {
            if radius <= 0.0 {
                continue;
            }
            let center = mesh.vertices.len() as u32;
            mesh.vertices
                .push(Vertex::new([0.0, y, 0.0], [0.0, normal, 0.0], [0.5, 0.5]));
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let (sin, cos) = theta.sin_cos();
                mesh.vertices.push(Vertex::new(
                    [radius * sin, y, radius * cos],
                    [0.0, normal, 0.0],
                    [0.5 + sin * 0.5, 0.5 + cos * 0.5],
                ));
            }
            for segment in 0..segments {
                let a = center + 1 + segment;
                if normal > 0.0 {
                    mesh.indices.extend_from_slice(&[center, a, a + 1]);
                } else {
                    mesh.indices.extend_from_slice(&[center, a + 1, a]);
                }
            }
        }

        mesh
    }

    /// Cone with its apex up.
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, segments)
    }

    /// Capsule: a cylinder of `length` with hemispherical caps of `radius`.
    /// Total height is `length + 2 * radius`.
    pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> Self {
        let cap_segments = cap_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let half = length * 0.5;
        let rings = cap_segments * 2 + 1;
        let mut mesh = Self::new();

        // Latitude rings: top cap (0..=cap_segments), bottom cap (cap_segments+1..=rings).
        for ring in 0..=rings {
            let (phi, offset) = if ring <= cap_segments {
                (PI * 0.5 * ring as f32 / cap_segments as f32, half)
            } else {
                (
                    PI * 0.5 + PI * 0.5 * (ring - cap_segments - 1) as f32 / cap_segments as f32,
                    -half,
                )
            };
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();
            for segment in 0..=radial_segments {
                let theta = TAU * segment as f32 / radial_segments as f32;
                let (sin, cos) = theta.sin_cos();
                let normal = Vec3::new(sin * phi.sin(), phi.cos(), cos * phi.sin());
                mesh.vertices.push(Vertex::new(
                    [ring_radius * sin, y + offset, ring_radius * cos],
                    normal.into(),
                    [segment as f32 / radial_segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        let stride = radial_segments + 1;
        for ring in 0..rings {
            for segment in 0..radial_segments {
                let a = ring * stride + segment;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        mesh
    }

    /// Append `other` transformed by `matrix`.
    pub fn append_transformed(&mut self, other: &MeshData, matrix: Mat4) {
        let base = self.vertices.len() as u32;
        let normal_matrix = matrix.inverse().transpose();
        self.vertices.extend(other.vertices.iter().map(|v| {
            let p = matrix.transform_point3(Vec3::from(v.position));
            let n = normal_matrix
                .transform_vector3(Vec3::from(v.normal))
                .normalize_or_zero();
            Vertex::new(p.into(), n.into(), v.tex_coords)
        }));
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Recompute smooth vertex normals from triangle faces.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(va), Some(vb), Some(vc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let pa = Vec3::from(va.position);
            let face = (Vec3::from(vb.position) - pa).cross(Vec3::from(vc.position) - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or_zero().into();
        }
    }

    /// Axis-aligned bounds as (min, max), or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &MeshData) -> bool {
        mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len())
    }

    #[test]
    fn grid_counts() {
        let mesh = MeshData::grid(100.0, 100.0, 4);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.triangle_count(), 32);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn cuboid_bounds_match_half_extents() {
        let mesh = MeshData::cuboid(Vec3::new(1.0, 2.0, 3.0));
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn capsule_spans_length_plus_caps() {
        let mesh = MeshData::capsule(0.5, 1.0, 4, 8);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max.y - 1.0).abs() < 1e-5);
        assert!((min.y + 1.0).abs() < 1e-5);
        assert!(max.x <= 0.5 + 1e-5);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn cone_has_apex_and_single_cap() {
        let mesh = MeshData::cone(1.0, 2.0, 8);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max.y - 1.0).abs() < 1e-5);
        assert!((min.y + 1.0).abs() < 1e-5);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn compute_normals_on_flat_quad_points_up() {
        let mut mesh = MeshData::plane(2.0, 2.0);
        for v in &mut mesh.vertices {
            v.normal = [0.0; 3];
        }
        mesh.compute_normals();
        for v in &mesh.vertices {
            assert!((Vec3::from(v.normal) - Vec3::Y).length() < 1e-5);
        }
    }

    #[test]
    fn append_transformed_offsets_indices() {
        let mut merged = MeshData::new();
        let quad = MeshData::plane(1.0, 1.0);
        merged.append_transformed(&quad, Mat4::IDENTITY);
        merged.append_transformed(&quad, Mat4::from_translation(Vec3::Y));
        assert_eq!(merged.vertices.len(), 8);
        assert_eq!(merged.indices[6], 4);
        assert!((merged.vertices[4].position[1] - 1.0).abs() < 1e-6);
    }
}
