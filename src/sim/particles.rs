//! Food particles and the consumption check
//!
//! A session owns one batch of particles for its whole lifetime. Consumed
//! particles are flagged and hidden, never removed, so indices stay
//! stable for the removal tweens and for iteration.

use std::collections::HashMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::vehicle::Enzyme;
use crate::tuning::ParticleTuning;

/// Batches larger than this get a spatial grid instead of the linear scan
pub const GRID_THRESHOLD: usize = 150;

/// Render-only state animated by the removal tween
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleVisual {
    pub scale: f32,
    pub opacity: f32,
    /// Upward drift while shrinking
    pub rise: f32,
    /// Spin about X and Y while shrinking (radians)
    pub spin: f32,
    pub visible: bool,
}

impl Default for ParticleVisual {
    fn default() -> Self {
        Self {
            scale: 1.0,
            opacity: 0.9,
            rise: 0.0,
            spin: 0.0,
            visible: true,
        }
    }
}

/// A collectible food particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodParticle {
    pub id: u32,
    /// Fixed at spawn
    pub pos: Vec3,
    pub radius: f32,
    pub points: u32,
    /// Once set, the particle never scores or collides again
    pub consumed: bool,
    pub visual: ParticleVisual,
}

impl FoodParticle {
    pub fn new(id: u32, pos: Vec3, radius: f32, points: u32) -> Self {
        Self {
            id,
            pos,
            radius,
            points,
            consumed: false,
            visual: ParticleVisual::default(),
        }
    }

    /// Where the renderer should draw it
    pub fn render_pos(&self) -> Vec3 {
        self.pos + Vec3::Y * self.visual.rise
    }
}

/// Spawn a deterministic batch inside the reachable volume
pub fn spawn_batch(seed: u64, tuning: &ParticleTuning) -> Vec<FoodParticle> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let r = tuning.spawn_radius;

    (0..tuning.count)
        .map(|id| {
            // Rejection-sample the square so every particle lies in the disc
            let (x, z) = loop {
                let x = rng.random_range(-r..=r);
                let z = rng.random_range(-r..=r);
                if x * x + z * z <= r * r {
                    break (x, z);
                }
            };
            let y = if tuning.spawn_y > 0.0 {
                rng.random_range(-tuning.spawn_y..=tuning.spawn_y)
            } else {
                0.0
            };
            let radius = rng.random_range(tuning.min_radius..=tuning.max_radius);
            let points = rng.random_range(tuning.min_points..=tuning.max_points);
            FoodParticle::new(id, Vec3::new(x, y, z), radius, points)
        })
        .collect()
}

/// A particle newly consumed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumption {
    /// Index into the batch
    pub index: usize,
    pub particle_id: u32,
    pub points: u32,
}

/// Candidate search for the consumption check
///
/// Implementations may return extra candidates (the narrow phase filters
/// them) but must never miss a particle within `reach` of `center`.
pub trait BroadPhase {
    fn candidates(&self, particles: &[FoodParticle], center: Vec3, reach: f32, out: &mut Vec<usize>);
}

/// Linear scan over every live particle
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn candidates(&self, particles: &[FoodParticle], _center: Vec3, _reach: f32, out: &mut Vec<usize>) {
        out.extend(
            particles
                .iter()
                .enumerate()
                .filter(|(_, p)| !p.consumed)
                .map(|(i, _)| i),
        );
    }
}

/// Uniform grid over the static particle positions
#[derive(Debug, Clone, Default)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32, i32), Vec<usize>>,
}

impl UniformGrid {
    /// Bucket every particle by the cell holding its centre
    pub fn build(particles: &[FoodParticle], cell_size: f32) -> Self {
        let cell_size = cell_size.max(f32::EPSILON);
        let mut cells: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();
        for (i, p) in particles.iter().enumerate() {
            cells.entry(cell_of(p.pos, cell_size)).or_default().push(i);
        }
        Self { cell_size, cells }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }
}

fn cell_of(pos: Vec3, cell_size: f32) -> (i32, i32, i32) {
    (
        (pos.x / cell_size).floor() as i32,
        (pos.y / cell_size).floor() as i32,
        (pos.z / cell_size).floor() as i32,
    )
}

impl BroadPhase for UniformGrid {
    fn candidates(&self, particles: &[FoodParticle], center: Vec3, reach: f32, out: &mut Vec<usize>) {
        let lo = cell_of(center - Vec3::splat(reach), self.cell_size);
        let hi = cell_of(center + Vec3::splat(reach), self.cell_size);
        let start = out.len();
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    if let Some(bucket) = self.cells.get(&(x, y, z)) {
                        out.extend(bucket.iter().copied().filter(|&i| !particles[i].consumed));
                    }
                }
            }
        }
        // Keep batch order so consumption order matches the linear scan
        out[start..].sort_unstable();
    }
}

/// Broad phase chosen for a batch
#[derive(Debug, Clone)]
pub enum ParticleIndex {
    Linear(BruteForce),
    Grid(UniformGrid),
}

impl ParticleIndex {
    /// Linear scan for small batches, a grid sized to the largest reach otherwise
    pub fn for_batch(particles: &[FoodParticle], enzyme_radius: f32, max_particle_radius: f32) -> Self {
        if particles.len() > GRID_THRESHOLD {
            let cell = 2.0 * (enzyme_radius + max_particle_radius);
            ParticleIndex::Grid(UniformGrid::build(particles, cell))
        } else {
            ParticleIndex::Linear(BruteForce)
        }
    }
}

impl Default for ParticleIndex {
    fn default() -> Self {
        ParticleIndex::Linear(BruteForce)
    }
}

impl BroadPhase for ParticleIndex {
    fn candidates(&self, particles: &[FoodParticle], center: Vec3, reach: f32, out: &mut Vec<usize>) {
        match self {
            ParticleIndex::Linear(b) => b.candidates(particles, center, reach, out),
            ParticleIndex::Grid(g) => g.candidates(particles, center, reach, out),
        }
    }
}

/// Flag every live particle overlapping the enzyme
///
/// Each particle is reported at most once over its lifetime: the
/// `consumed` flag is set here and excludes it from every later check.
pub fn consume_overlapping(
    enzyme: &Enzyme,
    particles: &mut [FoodParticle],
    broad: &impl BroadPhase,
    max_particle_radius: f32,
    consumed: &mut Vec<Consumption>,
) {
    let center = enzyme.body_pos();
    let mut candidates = Vec::new();
    broad.candidates(
        particles,
        center,
        enzyme.radius + max_particle_radius,
        &mut candidates,
    );

    for i in candidates {
        let particle = &mut particles[i];
        if particle.consumed {
            continue;
        }
        let distance = center.distance(particle.pos);
        if distance < enzyme.radius + particle.radius {
            particle.consumed = true;
            consumed.push(Consumption {
                index: i,
                particle_id: particle.id,
                points: particle.points,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> ParticleTuning {
        ParticleTuning::default()
    }

    #[test]
    fn test_spawn_is_deterministic_and_in_range() {
        let t = tuning();
        let a = spawn_batch(42, &t);
        let b = spawn_batch(42, &t);
        assert_eq!(a.len(), t.count as usize);
        for (p, q) in a.iter().zip(&b) {
            assert_eq!(p.pos, q.pos);
            assert_eq!(p.points, q.points);
            let r = (p.pos.x * p.pos.x + p.pos.z * p.pos.z).sqrt();
            assert!(r <= t.spawn_radius + 1e-5);
            assert!(p.pos.y.abs() <= t.spawn_y);
            assert!((t.min_radius..=t.max_radius).contains(&p.radius));
            assert!((t.min_points..=t.max_points).contains(&p.points));
            assert!(!p.consumed && p.visual.visible);
        }
        let c = spawn_batch(43, &t);
        assert!(a.iter().zip(&c).any(|(p, q)| p.pos != q.pos));
    }

    #[test]
    fn test_consume_only_overlapping() {
        let mut enzyme = Enzyme::new(0.4);
        enzyme.pos = Vec3::new(1.0, 0.0, 0.0);
        let mut particles = vec![
            FoodParticle::new(0, Vec3::new(1.5, 0.0, 0.0), 0.2, 7),
            FoodParticle::new(1, Vec3::new(3.0, 0.0, 0.0), 0.5, 9),
        ];
        let mut hits = Vec::new();
        consume_overlapping(&enzyme, &mut particles, &BruteForce, 0.5, &mut hits);
        assert_eq!(
            hits,
            vec![Consumption {
                index: 0,
                particle_id: 0,
                points: 7
            }]
        );
        assert!(particles[0].consumed);
        assert!(!particles[1].consumed);
    }

    #[test]
    fn test_consumed_particle_never_reported_twice() {
        let enzyme = Enzyme::new(0.4);
        let mut particles = vec![FoodParticle::new(0, Vec3::new(0.1, 0.0, 0.0), 0.3, 5)];
        let mut hits = Vec::new();
        consume_overlapping(&enzyme, &mut particles, &BruteForce, 0.5, &mut hits);
        consume_overlapping(&enzyme, &mut particles, &BruteForce, 0.5, &mut hits);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_float_offset_reaches_particles() {
        let mut enzyme = Enzyme::new(0.4);
        enzyme.float_offset = Vec3::new(0.0, 0.15, 0.0);
        let mut particles = vec![FoodParticle::new(0, Vec3::new(0.0, 0.7, 0.0), 0.2, 5)];
        let mut hits = Vec::new();
        consume_overlapping(&enzyme, &mut particles, &BruteForce, 0.5, &mut hits);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_touching_is_not_overlapping() {
        let enzyme = Enzyme::new(0.5);
        let mut particles = vec![FoodParticle::new(0, Vec3::new(1.0, 0.0, 0.0), 0.5, 5)];
        let mut hits = Vec::new();
        consume_overlapping(&enzyme, &mut particles, &BruteForce, 0.5, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_grid_matches_linear_scan() {
        let t = ParticleTuning {
            count: 400,
            ..tuning()
        };
        let batch = spawn_batch(7, &t);
        let grid = UniformGrid::build(&batch, 2.0 * (0.4 + t.max_radius));

        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..200 {
            let mut enzyme = Enzyme::new(0.4);
            enzyme.pos = Vec3::new(
                rng.random_range(-6.0..6.0),
                rng.random_range(-3.0..3.0),
                rng.random_range(-6.0..6.0),
            );
            let mut linear = batch.clone();
            let mut gridded = batch.clone();
            let mut a = Vec::new();
            let mut b = Vec::new();
            consume_overlapping(&enzyme, &mut linear, &BruteForce, t.max_radius, &mut a);
            consume_overlapping(&enzyme, &mut gridded, &grid, t.max_radius, &mut b);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_index_switches_to_grid_for_large_batches() {
        let small = spawn_batch(1, &tuning());
        assert!(matches!(
            ParticleIndex::for_batch(&small, 0.4, 0.5),
            ParticleIndex::Linear(_)
        ));
        let large = spawn_batch(
            1,
            &ParticleTuning {
                count: 500,
                ..tuning()
            },
        );
        assert!(matches!(
            ParticleIndex::for_batch(&large, 0.4, 0.5),
            ParticleIndex::Grid(_)
        ));
    }
}
