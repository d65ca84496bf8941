//! Gastric fluid surface animation
//!
//! The surface is a flat XZ grid whose heights are recomputed from the
//! untouched base positions every update, so the field depends only on
//! the elapsed wave time and never accumulates error.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::WAVE_SPEED;

/// One periodic term: `amplitude * wave(frequency * coord ± speed * t)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveTerm {
    pub amplitude: f32,
    /// Spatial frequency
    pub frequency: f32,
    /// Temporal frequency
    pub speed: f32,
}

impl WaveTerm {
    pub const fn new(amplitude: f32, frequency: f32, speed: f32) -> Self {
        Self {
            amplitude,
            frequency,
            speed,
        }
    }
}

/// The four terms summed into each vertex height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Rings travelling outward from the centre
    pub radial: WaveTerm,
    /// Ripple around the centre, keyed on polar angle
    pub circular: WaveTerm,
    pub cross_x: WaveTerm,
    pub cross_z: WaveTerm,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            radial: WaveTerm::new(0.2, 0.4, 2.0),
            circular: WaveTerm::new(0.12, 5.0, 1.5),
            cross_x: WaveTerm::new(0.15, 0.5, 2.2),
            cross_z: WaveTerm::new(0.15, 0.5, 1.8),
        }
    }
}

impl WaveParams {
    /// Height at flat position (x, z) and wave time `t`
    pub fn height(&self, x: f32, z: f32, t: f32) -> f32 {
        let distance = (x * x + z * z).sqrt();
        let angle = z.atan2(x);

        let radial = (distance * self.radial.frequency - t * self.radial.speed).sin()
            * self.radial.amplitude;
        let circular = (angle * self.circular.frequency + t * self.circular.speed).sin()
            * self.circular.amplitude;
        let cross_x =
            (x * self.cross_x.frequency + t * self.cross_x.speed).sin() * self.cross_x.amplitude;
        let cross_z =
            (z * self.cross_z.frequency + t * self.cross_z.speed).cos() * self.cross_z.amplitude;

        radial + circular + cross_x + cross_z
    }
}

/// GPU-ready surface vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Displace `base` into `out` for wave time `t`
///
/// Pure: identical inputs produce bit-identical heights. Horizontal
/// coordinates are copied through unchanged.
pub fn displace(base: &[Vec3], params: &WaveParams, t: f32, out: &mut [SurfaceVertex]) {
    for (vertex, flat) in out.iter_mut().zip(base) {
        vertex.position = [flat.x, params.height(flat.x, flat.z, t), flat.z];
    }
}

/// Smooth vertex normals from accumulated (area-weighted) face normals
pub fn compute_normals(vertices: &mut [SurfaceVertex], indices: &[u32]) {
    let mut accum = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(vertices[a].position);
        let pb = Vec3::from(vertices[b].position);
        let pc = Vec3::from(vertices[c].position);
        let face = (pc - pb).cross(pa - pb);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    for (vertex, n) in vertices.iter_mut().zip(accum) {
        vertex.normal = n.normalize_or(Vec3::Y).to_array();
    }
}

/// Subdivided plane plus its animated copy
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    segments: u32,
    base: Vec<Vec3>,
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Flat `width` x `depth` grid centred on the origin
    pub fn grid(width: f32, depth: f32, segments: u32) -> Self {
        let segments = segments.max(1);
        let row = segments + 1;
        let step_x = width / segments as f32;
        let step_z = depth / segments as f32;

        let mut base = Vec::with_capacity((row * row) as usize);
        for j in 0..row {
            for i in 0..row {
                base.push(Vec3::new(
                    -width * 0.5 + i as f32 * step_x,
                    0.0,
                    -depth * 0.5 + j as f32 * step_z,
                ));
            }
        }

        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for j in 0..segments {
            for i in 0..segments {
                let a = j * row + i;
                let b = (j + 1) * row + i;
                let c = j * row + i + 1;
                let d = (j + 1) * row + i + 1;
                indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }

        let vertices = base
            .iter()
            .map(|p| SurfaceVertex {
                position: p.to_array(),
                normal: [0.0, 1.0, 0.0],
            })
            .collect();

        Self {
            segments,
            base,
            vertices,
            indices,
        }
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Flat reference positions
    pub fn base(&self) -> &[Vec3] {
        &self.base
    }

    /// Recompute heights and normals for wave time `t`
    pub fn update(&mut self, params: &WaveParams, t: f32) {
        displace(&self.base, params, t, &mut self.vertices);
        compute_normals(&mut self.vertices, &self.indices);
    }

    /// Vertex bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Wave phase accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveClock {
    pub time: f32,
}

impl WaveClock {
    pub fn advance(&mut self, dt: f32) {
        self.time += WAVE_SPEED * dt;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SIM_DT, SURFACE_DEPTH, SURFACE_WIDTH};

    #[test]
    fn test_grid_layout() {
        let mesh = SurfaceMesh::grid(SURFACE_WIDTH, SURFACE_DEPTH, 4);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.indices.len(), 4 * 4 * 6);
        assert_eq!(mesh.base()[0], Vec3::new(-7.0, 0.0, -6.3));
        assert!((mesh.base()[24] - Vec3::new(7.0, 0.0, 6.3)).length() < 1e-5);
        assert_eq!(
            mesh.vertex_bytes().len(),
            25 * std::mem::size_of::<SurfaceVertex>()
        );
    }

    #[test]
    fn test_flat_normals_point_up() {
        let mut mesh = SurfaceMesh::grid(10.0, 10.0, 3);
        compute_normals(&mut mesh.vertices, &mesh.indices);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.normal) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_update_is_deterministic() {
        let params = WaveParams::default();
        let mut a = SurfaceMesh::grid(SURFACE_WIDTH, SURFACE_DEPTH, 16);
        let mut b = a.clone();
        a.update(&params, 3.7);
        // Run b through other times first; the result must not depend on history
        b.update(&params, 1.0);
        b.update(&params, 12.5);
        b.update(&params, 3.7);
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert_eq!(va.position[1].to_bits(), vb.position[1].to_bits());
        }
    }

    #[test]
    fn test_horizontal_coordinates_never_move() {
        let params = WaveParams::default();
        let mut mesh = SurfaceMesh::grid(SURFACE_WIDTH, SURFACE_DEPTH, 8);
        for step in 0..10 {
            mesh.update(&params, step as f32 * 0.5);
        }
        for (v, flat) in mesh.vertices.iter().zip(mesh.base()) {
            assert_eq!(v.position[0], flat.x);
            assert_eq!(v.position[2], flat.z);
        }
    }

    #[test]
    fn test_height_is_sum_of_terms() {
        let params = WaveParams::default();
        let (x, z, t) = (1.5f32, -2.0f32, 0.75f32);
        let d = (x * x + z * z).sqrt();
        let angle = z.atan2(x);
        let expected = (d * 0.4 - t * 2.0).sin() * 0.2
            + (angle * 5.0 + t * 1.5).sin() * 0.12
            + (x * 0.5 + t * 2.2).sin() * 0.15
            + (z * 0.5 + t * 1.8).cos() * 0.15;
        assert!((params.height(x, z, t) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_displaced_normals_are_unit() {
        let mut mesh = SurfaceMesh::grid(SURFACE_WIDTH, SURFACE_DEPTH, 12);
        mesh.update(&WaveParams::default(), 2.0);
        for v in &mesh.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn test_clock_matches_per_tick_advance() {
        let mut clock = WaveClock::default();
        clock.advance(SIM_DT);
        assert!((clock.time - 0.015).abs() < 1e-6);
    }
}
