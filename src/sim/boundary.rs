//! Stomach cavity bounds
//!
//! The play volume is a right cylinder: a horizontal circle of
//! `max_radius` and a vertical band of `±y_max`. The side wall is a full
//! elastic reflection while the floor and ceiling only return a damped
//! fraction of the vertical speed; the cavity is open vertically, so the
//! two walls are meant to feel different.

use glam::Vec3;

use crate::radial_normal;
use crate::tuning::BoundaryTuning;

/// Which walls were touched during resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryHit {
    pub side: bool,
    pub vertical: bool,
}

impl BoundaryHit {
    pub fn any(&self) -> bool {
        self.side || self.vertical
    }
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Confine `pos` to the cavity, bouncing `vel` off whatever wall it crossed
///
/// The position is clamped onto the wall at the crossing angle rather than
/// restored to its previous value, so a fast entity can never tunnel out.
pub fn resolve_boundary(pos: &mut Vec3, vel: &mut Vec3, tuning: &BoundaryTuning) -> BoundaryHit {
    let mut hit = BoundaryHit::default();

    let distance = (pos.x * pos.x + pos.z * pos.z).sqrt();
    if distance > tuning.max_radius {
        let normal = radial_normal(*pos);
        *vel = reflect_velocity(*vel, normal);
        pos.x = normal.x * tuning.max_radius;
        pos.z = normal.z * tuning.max_radius;
        hit.side = true;
    }

    if pos.y < -tuning.y_max || pos.y > tuning.y_max {
        vel.y *= -tuning.vertical_bounce;
        pos.y = pos.y.clamp(-tuning.y_max, tuning.y_max);
        hit.vertical = true;
    }

    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds() -> BoundaryTuning {
        BoundaryTuning::default()
    }

    #[test]
    fn test_inside_is_untouched() {
        let mut pos = Vec3::new(3.0, 1.0, -2.0);
        let mut vel = Vec3::new(0.1, 0.05, 0.1);
        let hit = resolve_boundary(&mut pos, &mut vel, &bounds());
        assert!(!hit.any());
        assert_eq!(pos, Vec3::new(3.0, 1.0, -2.0));
        assert_eq!(vel, Vec3::new(0.1, 0.05, 0.1));
    }

    #[test]
    fn test_side_wall_clamps_and_flips_radial_velocity() {
        let b = bounds();
        let dir = Vec3::new(0.6, 0.0, 0.8);
        let mut pos = dir * (b.max_radius + 5.0);
        let mut vel = dir * 0.2 + Vec3::new(-0.8, 0.0, 0.6) * 0.05;
        let radial_before = vel.dot(dir);

        let hit = resolve_boundary(&mut pos, &mut vel, &b);
        assert!(hit.side && !hit.vertical);

        let r = (pos.x * pos.x + pos.z * pos.z).sqrt();
        assert!((r - b.max_radius).abs() < 1e-5);
        assert!((pos.normalize() - dir).length() < 1e-5);

        let radial_after = vel.dot(dir);
        assert!(radial_before > 0.0 && radial_after < 0.0);
        assert!((radial_after + radial_before).abs() < 1e-6);
        // Tangential component survives the elastic bounce
        assert!((vel.dot(Vec3::new(-0.8, 0.0, 0.6)) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_bounce_is_damped() {
        let b = bounds();
        let mut pos = Vec3::new(0.0, b.y_max + 0.3, 0.0);
        let mut vel = Vec3::new(0.0, 0.2, 0.0);
        let hit = resolve_boundary(&mut pos, &mut vel, &b);
        assert!(hit.vertical && !hit.side);
        assert_eq!(pos.y, b.y_max);
        assert!((vel.y + 0.1).abs() < 1e-6);

        let mut pos = Vec3::new(0.0, -b.y_max - 1.0, 0.0);
        let mut vel = Vec3::new(0.0, -0.2, 0.0);
        resolve_boundary(&mut pos, &mut vel, &b);
        assert_eq!(pos.y, -b.y_max);
        assert!((vel.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec3::new(1.0, 0.0, 0.5), Vec3::X);
        assert!((reflected - Vec3::new(-1.0, 0.0, 0.5)).length() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_always_contained(
            x in -50.0f32..50.0, y in -50.0f32..50.0, z in -50.0f32..50.0,
            vx in -1.0f32..1.0, vy in -1.0f32..1.0, vz in -1.0f32..1.0,
        ) {
            let b = bounds();
            let mut pos = Vec3::new(x, y, z);
            let mut vel = Vec3::new(vx, vy, vz);
            let speed_before = vel.length();
            resolve_boundary(&mut pos, &mut vel, &b);
            let r = (pos.x * pos.x + pos.z * pos.z).sqrt();
            prop_assert!(r <= b.max_radius + 1e-4);
            prop_assert!(pos.y.abs() <= b.y_max + 1e-4);
            // Bounces never add energy
            prop_assert!(vel.length() <= speed_before + 1e-5);
        }
    }
}
