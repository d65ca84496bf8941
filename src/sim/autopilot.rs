//! Demo-mode driver
//!
//! Produces the same `Controls` a player would, so the simulation cannot
//! tell the autopilot apart from a keyboard.

use glam::Vec3;

use super::input::Controls;
use super::particles::FoodParticle;
use super::vehicle::Enzyme;
use crate::normalize_angle;

/// Heading error tolerated before turning (radians)
const TURN_DEADBAND: f32 = 0.05;
/// Heading error under which the autopilot also accelerates
const THRUST_CONE: f32 = 0.6;
/// Vertical gap before lift/drop is used
const VERTICAL_DEADBAND: f32 = 0.2;

/// Yaw that points the enzyme along `dir`
pub fn heading_towards(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

/// Nearest particle still in play
pub fn nearest_live(pos: Vec3, particles: &[FoodParticle]) -> Option<&FoodParticle> {
    particles
        .iter()
        .filter(|p| !p.consumed)
        .min_by(|a, b| {
            pos.distance_squared(a.pos)
                .partial_cmp(&pos.distance_squared(b.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Steer toward the nearest live particle
pub fn steer(enzyme: &Enzyme, particles: &[FoodParticle]) -> Controls {
    let Some(target) = nearest_live(enzyme.pos, particles) else {
        return Controls::default();
    };

    let delta = target.pos - enzyme.pos;
    let flat = Vec3::new(delta.x, 0.0, delta.z);
    let error = if flat.length_squared() > f32::EPSILON {
        normalize_angle(heading_towards(flat) - enzyme.heading)
    } else {
        0.0
    };

    Controls {
        turn_left: error < -TURN_DEADBAND,
        turn_right: error > TURN_DEADBAND,
        forward: error.abs() < THRUST_CONE,
        reverse: false,
        lift: delta.y > VERTICAL_DEADBAND,
        drop: delta.y < -VERTICAL_DEADBAND,
    }
}
