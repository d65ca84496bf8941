//! Ambient stomach scene
//!
//! Decoration that animates behind the game in every phase: food
//! particles drifting through the cavity and gas bubbles bobbing on the
//! fluid surface. None of it collides with the enzyme.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::catalog::{NodeId, NodeKind, SceneCatalog};
use crate::consts::{
    AMBIENT_BUBBLES, AMBIENT_PARTICLES, AMBIENT_TIME_RATE, DRIFT_HALF_X, DRIFT_HALF_Y,
    DRIFT_HALF_Z, DRIFT_REBOUND, FLUID_LEVEL,
};
use crate::tick_scale;

/// Per-tick wobble added on top of a particle's drift velocity
const JITTER: f32 = 0.0005;
/// Vertical bob of a bubble around its rest height
const BUBBLE_BOB: f32 = 0.3;
/// Relative scale swing of a bubble
const BUBBLE_PULSE: f32 = 0.1;
/// Bubble spin per tick about X and Y
const BUBBLE_SPIN: (f32, f32) = (0.01, 0.015);

/// Free-floating food particle (decoration only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftParticle {
    pub node: NodeId,
    pub pos: Vec3,
    /// Drift per tick
    pub vel: Vec3,
    /// Euler rotation (radians)
    pub rotation: Vec3,
    /// Rotation per tick
    pub spin: Vec3,
    pub radius: f32,
    /// Phase offset for the jitter terms
    seed_phase: f32,
}

impl DriftParticle {
    fn step(&mut self, time: f32, k: f32) {
        let p = self.seed_phase;
        let jitter = Vec3::new(
            (time * 2.0 + p).sin(),
            (time * 1.5 + p).cos(),
            (time * 0.8 + p * 0.1).sin(),
        ) * JITTER;
        self.pos += (self.vel + jitter) * k;
        self.rotation += self.spin * k;

        // Leaving the cavity wraps to the opposite side with a damped rebound
        let half = [DRIFT_HALF_X, DRIFT_HALF_Y, DRIFT_HALF_Z];
        for (axis, limit) in half.into_iter().enumerate() {
            if self.pos[axis].abs() > limit {
                self.pos[axis] = -self.pos[axis].signum() * limit;
                self.vel[axis] *= -DRIFT_REBOUND;
            }
        }
    }
}

/// Gas bubble floating on the fluid surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub node: NodeId,
    pub pos: Vec3,
    /// Height the bob oscillates around
    pub rest_y: f32,
    pub radius: f32,
    pub scale: f32,
    /// Rotation about X and Y (radians)
    pub rotation: (f32, f32),
    speed: f32,
    phase: f32,
}

impl Bubble {
    fn step(&mut self, time: f32, k: f32) {
        self.pos.y = self.rest_y + (time * self.speed + self.phase).sin() * BUBBLE_BOB;
        self.scale = 1.0 + (time * 2.0 + self.phase).sin() * BUBBLE_PULSE;
        self.rotation.0 += BUBBLE_SPIN.0 * k;
        self.rotation.1 += BUBBLE_SPIN.1 * k;
    }
}

/// Everything in the scene that moves on its own
#[derive(Debug, Clone, Default)]
pub struct AmbientScene {
    pub particles: Vec<DriftParticle>,
    pub bubbles: Vec<Bubble>,
    /// Scene animation clock
    pub time: f32,
}

impl AmbientScene {
    /// Seeded scene with the default population, registered in `catalog`
    pub fn spawn(seed: u64, catalog: &mut SceneCatalog) -> Self {
        Self::with_counts(seed, AMBIENT_PARTICLES, AMBIENT_BUBBLES, catalog)
    }

    pub fn with_counts(
        seed: u64,
        particles: u32,
        bubbles: u32,
        catalog: &mut SceneCatalog,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ 0xA3B1_E7C5);

        let particles = (0..particles)
            .map(|i| {
                let mut axis = |half: f32| rng.random_range(-half..=half);
                let pos = Vec3::new(axis(DRIFT_HALF_X), axis(DRIFT_HALF_Y), axis(DRIFT_HALF_Z));
                let vel = Vec3::new(axis(0.01), axis(0.01), axis(0.01));
                let spin = Vec3::new(axis(0.01), axis(0.01), axis(0.01));
                DriftParticle {
                    node: catalog.register(NodeKind::FoodParticle),
                    pos,
                    vel,
                    rotation: Vec3::ZERO,
                    spin,
                    radius: rng.random_range(0.15..=0.4),
                    seed_phase: i as f32,
                }
            })
            .collect();

        let bubbles = (0..bubbles)
            .map(|_| {
                let rest_y = FLUID_LEVEL + rng.random_range(0.0..=0.5);
                let pos = Vec3::new(
                    rng.random_range(-6.0..=6.0),
                    rest_y,
                    rng.random_range(-5.0..=5.0),
                );
                Bubble {
                    node: catalog.register(NodeKind::GasBubble),
                    pos,
                    rest_y,
                    radius: rng.random_range(0.08..=0.33),
                    scale: 1.0,
                    rotation: (0.0, 0.0),
                    speed: rng.random_range(0.2..=0.5),
                    phase: rng.random_range(0.0..=std::f32::consts::TAU),
                }
            })
            .collect();

        Self {
            particles,
            bubbles,
            time: 0.0,
        }
    }

    /// Advance the scene by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let k = tick_scale(dt);
        self.time += AMBIENT_TIME_RATE * dt;
        let time = self.time;
        for particle in &mut self.particles {
            particle.step(time, k);
        }
        for bubble in &mut self.bubbles {
            bubble.step(time, k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn scene(seed: u64) -> AmbientScene {
        AmbientScene::spawn(seed, &mut SceneCatalog::new())
    }

    fn inside(pos: Vec3) -> bool {
        pos.x.abs() <= DRIFT_HALF_X + 1e-5
            && pos.y.abs() <= DRIFT_HALF_Y + 1e-5
            && pos.z.abs() <= DRIFT_HALF_Z + 1e-5
    }

    #[test]
    fn test_spawn_registers_every_body() {
        let mut catalog = SceneCatalog::new();
        let scene = AmbientScene::spawn(3, &mut catalog);
        assert_eq!(scene.particles.len(), AMBIENT_PARTICLES as usize);
        assert_eq!(scene.bubbles.len(), AMBIENT_BUBBLES as usize);
        assert_eq!(
            catalog.len(),
            (AMBIENT_PARTICLES + AMBIENT_BUBBLES) as usize
        );
        assert_eq!(catalog.kind(scene.bubbles[0].node), Some(NodeKind::GasBubble));
        assert_eq!(
            catalog.kind(scene.particles[0].node),
            Some(NodeKind::FoodParticle)
        );
        assert!(scene.particles.iter().all(|p| inside(p.pos)));
    }

    #[test]
    fn test_drift_stays_in_cavity() {
        let mut scene = scene(11);
        for _ in 0..60 * 30 {
            scene.update(SIM_DT);
        }
        assert!(scene.particles.iter().all(|p| inside(p.pos)));
    }

    #[test]
    fn test_wall_wraps_to_far_side_and_rebounds() {
        let mut scene = AmbientScene::with_counts(1, 1, 0, &mut SceneCatalog::new());
        let particle = &mut scene.particles[0];
        particle.pos = Vec3::new(DRIFT_HALF_X - 0.001, 0.0, 0.0);
        particle.vel = Vec3::new(0.01, 0.0, 0.0);
        scene.update(SIM_DT);

        let particle = &scene.particles[0];
        assert_eq!(particle.pos.x, -DRIFT_HALF_X);
        assert!((particle.vel.x + 0.008).abs() < 1e-6);
    }

    #[test]
    fn test_bubbles_bob_around_rest_height() {
        let mut scene = scene(5);
        let mut moved = false;
        for _ in 0..600 {
            scene.update(SIM_DT);
            for bubble in &scene.bubbles {
                assert!((bubble.pos.y - bubble.rest_y).abs() <= BUBBLE_BOB + 1e-5);
                assert!((bubble.scale - 1.0).abs() <= BUBBLE_PULSE + 1e-5);
                moved |= bubble.pos.y != bubble.rest_y;
            }
        }
        assert!(moved);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let mut a = scene(8);
        let mut b = scene(8);
        for _ in 0..100 {
            a.update(SIM_DT);
            b.update(SIM_DT);
        }
        assert_eq!(a.particles[7].pos, b.particles[7].pos);
        assert_eq!(a.bubbles[3].pos, b.bubbles[3].pos);
    }
}
