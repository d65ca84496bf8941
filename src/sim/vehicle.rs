//! Enzyme vehicle controller
//!
//! Car-like handling: turn keys change yaw, thrust keys push along the
//! heading, drag bleeds speed every tick and a hard cap limits it.
//! All gains are per 60 Hz tick and scaled by the elapsed time.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::input::Controls;
use crate::consts::AMBIENT_TIME_RATE;
use crate::tuning::VehicleTuning;
use crate::{forward_vector, lerp_factor, tick_scale};

/// Roll applied while a turn key is held (cosmetic)
pub const TURN_TILT: f32 = 0.2;
/// Blend toward the target roll per tick
const TILT_BLEND: f32 = 0.1;

/// Idle float: vertical bob amplitude and base rate
const FLOAT_AMOUNT: f32 = 0.15;
const FLOAT_SPEED: f32 = 1.5;
/// Horizontal sway amplitude
const FLOAT_SWAY: f32 = 0.1;
/// Light intensity before breathing and pulses
pub const LIGHT_INTENSITY: f32 = 1.5;

/// The player-controlled enzyme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enzyme {
    pub pos: Vec3,
    /// Yaw in radians, independent of the visual tilt
    pub heading: f32,
    pub vel: Vec3,
    /// Collision radius
    pub radius: f32,
    /// Visual roll toward the turn direction
    pub tilt: f32,
    /// Forward/reverse thrust applied last tick
    pub thrusting: bool,
    /// Light intensity multiplier (pulses on consumption)
    pub glow: f32,
    /// Idle animation clock
    pub float_time: f32,
    /// Bob added on top of `pos`; collisions see it, the physics does not
    pub float_offset: Vec3,
    /// Slow light breathing, 0.6..=1.0
    pub breath: f32,
}

impl Enzyme {
    /// Spawn at the centre of the cavity facing -Z
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            heading: 0.0,
            vel: Vec3::ZERO,
            radius,
            tilt: 0.0,
            thrusting: false,
            glow: 1.0,
            float_time: 0.0,
            float_offset: Vec3::ZERO,
            breath: 0.8,
        }
    }

    /// Advance the idle float and light breathing by `dt` seconds
    pub fn idle_float(&mut self, dt: f32) {
        self.float_time += AMBIENT_TIME_RATE * dt;
        let t = self.float_time * FLOAT_SPEED;
        self.float_offset = Vec3::new(
            (t * 0.7).cos() * FLOAT_SWAY,
            t.sin() * FLOAT_AMOUNT,
            (t * 0.5).sin() * FLOAT_SWAY,
        );
        self.breath = 0.8 + (self.float_time * 3.0).sin() * 0.2;
    }

    /// Where the body is drawn and where it touches particles
    pub fn body_pos(&self) -> Vec3 {
        self.pos + self.float_offset
    }

    pub fn light_intensity(&self) -> f32 {
        LIGHT_INTENSITY * self.breath * self.glow
    }

    pub fn forward(&self) -> Vec3 {
        forward_vector(self.heading)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// `decay` applied once per tick, expressed for `dt` seconds
#[inline]
fn decay_for(decay: f32, dt: f32) -> f32 {
    let steps = tick_scale(dt);
    if steps == 1.0 { decay } else { decay.powf(steps) }
}

/// Advance heading, velocity and position by one update
///
/// Vertical thrust is only honoured when `vertical_thrust` is enabled.
pub fn drive(
    enzyme: &mut Enzyme,
    controls: &Controls,
    tuning: &VehicleTuning,
    vertical_thrust: bool,
    dt: f32,
) {
    let k = tick_scale(dt);

    // Turning (no auto-centering)
    if controls.turn_left {
        enzyme.heading -= tuning.turn_rate * k;
    }
    if controls.turn_right {
        enzyme.heading += tuning.turn_rate * k;
    }

    // Thrust along the heading; forward wins when both are held
    let forward = enzyme.forward();
    if controls.forward {
        enzyme.vel += forward * tuning.forward_gain * k;
    } else if controls.reverse {
        enzyme.vel -= forward * tuning.reverse_gain * k;
    }
    enzyme.thrusting = controls.thrusting();

    if vertical_thrust {
        if controls.lift {
            enzyme.vel.y += tuning.vertical_gain * k;
        }
        if controls.drop {
            enzyme.vel.y -= tuning.vertical_gain * k;
        }
    }

    // Drag
    enzyme.vel *= decay_for(tuning.damping, dt);

    // Hard speed cap
    if enzyme.vel.length() > tuning.speed_cap {
        enzyme.vel = enzyme.vel.normalize_or_zero() * tuning.speed_cap;
    }

    enzyme.pos += enzyme.vel * k;

    // Cosmetic roll
    let mut target_tilt = 0.0;
    if controls.turn_left {
        target_tilt += TURN_TILT;
    }
    if controls.turn_right {
        target_tilt -= TURN_TILT;
    }
    enzyme.tilt += (target_tilt - enzyme.tilt) * lerp_factor(TILT_BLEND, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn tuning() -> VehicleTuning {
        VehicleTuning::default()
    }

    #[test]
    fn test_turn_left_without_thrust_keeps_position() {
        let mut enzyme = Enzyme::new(0.4);
        let controls = Controls {
            turn_left: true,
            ..Default::default()
        };
        let n = 25;
        for _ in 0..n {
            drive(&mut enzyme, &controls, &tuning(), false, SIM_DT);
        }
        let expected = -(n as f32) * tuning().turn_rate;
        assert!((enzyme.heading - expected).abs() < 1e-4);
        assert_eq!(enzyme.pos, Vec3::ZERO);
        assert_eq!(enzyme.vel, Vec3::ZERO);
        assert!(enzyme.tilt > 0.0);
    }

    #[test]
    fn test_forward_thrust_moves_along_heading() {
        let mut enzyme = Enzyme::new(0.4);
        let controls = Controls {
            forward: true,
            ..Default::default()
        };
        drive(&mut enzyme, &controls, &tuning(), false, SIM_DT);
        // One tick: 0.025 gain then 0.94 drag
        let expected = 0.025 * 0.94;
        assert!((enzyme.vel.z + expected).abs() < 1e-6);
        assert!((enzyme.pos.z + expected).abs() < 1e-6);
        assert!(enzyme.thrusting);
    }

    #[test]
    fn test_reverse_is_weaker_than_forward() {
        let mut fwd = Enzyme::new(0.4);
        let mut rev = Enzyme::new(0.4);
        let forward = Controls {
            forward: true,
            ..Default::default()
        };
        let reverse = Controls {
            reverse: true,
            ..Default::default()
        };
        drive(&mut fwd, &forward, &tuning(), false, SIM_DT);
        drive(&mut rev, &reverse, &tuning(), false, SIM_DT);
        assert!(rev.speed() < fwd.speed());
        assert!(rev.vel.z > 0.0, "reverse pushes backward");
    }

    #[test]
    fn test_speed_caps_at_limit() {
        let mut enzyme = Enzyme::new(0.4);
        let controls = Controls {
            forward: true,
            ..Default::default()
        };
        for _ in 0..200 {
            drive(&mut enzyme, &controls, &tuning(), false, SIM_DT);
        }
        // Terminal speed without a cap would be 0.025*0.94/0.06 ≈ 0.39
        assert!((enzyme.speed() - tuning().speed_cap).abs() < 1e-5);
    }

    #[test]
    fn test_vertical_thrust_requires_flag() {
        let controls = Controls {
            lift: true,
            ..Default::default()
        };
        let mut off = Enzyme::new(0.4);
        drive(&mut off, &controls, &tuning(), false, SIM_DT);
        assert_eq!(off.vel.y, 0.0);

        let mut on = Enzyme::new(0.4);
        drive(&mut on, &controls, &tuning(), true, SIM_DT);
        assert!(on.vel.y > 0.0);

        let drop = Controls {
            drop: true,
            ..Default::default()
        };
        let mut down = Enzyme::new(0.4);
        drive(&mut down, &drop, &tuning(), true, SIM_DT);
        assert!(down.vel.y < 0.0);
    }

    #[test]
    fn test_damping_without_input() {
        let mut enzyme = Enzyme::new(0.4);
        enzyme.vel = Vec3::new(0.1, 0.0, 0.0);
        drive(&mut enzyme, &Controls::default(), &tuning(), false, SIM_DT);
        assert!((enzyme.vel.x - 0.094).abs() < 1e-6);
        assert!(!enzyme.thrusting);
    }

    #[test]
    fn test_double_step_matches_two_ticks_of_drag() {
        let mut one = Enzyme::new(0.4);
        one.vel = Vec3::new(0.2, 0.0, 0.0);
        let mut two = one.clone();
        drive(&mut one, &Controls::default(), &tuning(), false, SIM_DT * 2.0);
        drive(&mut two, &Controls::default(), &tuning(), false, SIM_DT);
        drive(&mut two, &Controls::default(), &tuning(), false, SIM_DT);
        assert!((one.vel - two.vel).length() < 1e-5);
    }

    #[test]
    fn test_idle_float_moves_body_not_physics() {
        let mut enzyme = Enzyme::new(0.4);
        enzyme.pos = Vec3::new(1.0, 0.0, 0.0);
        let mut lowest = f32::MAX;
        let mut highest = f32::MIN;
        for _ in 0..300 {
            enzyme.idle_float(SIM_DT);
            let y = enzyme.body_pos().y;
            lowest = lowest.min(y);
            highest = highest.max(y);
            assert!(enzyme.float_offset.length() <= 0.21);
            assert!((0.6 - 1e-5..=1.0 + 1e-5).contains(&enzyme.breath));
        }
        assert_eq!(enzyme.pos, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(enzyme.vel, Vec3::ZERO);
        assert!(highest > 0.1 && lowest < -0.1);
    }

    #[test]
    fn test_light_combines_breath_and_glow() {
        let mut enzyme = Enzyme::new(0.4);
        assert!((enzyme.light_intensity() - 1.2).abs() < 1e-6);
        enzyme.glow = 2.0;
        assert!((enzyme.light_intensity() - 2.4).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_cap(
            vx in -2.0f32..2.0, vy in -2.0f32..2.0, vz in -2.0f32..2.0,
            heading in -10.0f32..10.0,
            forward in any::<bool>(), reverse in any::<bool>(),
            left in any::<bool>(), right in any::<bool>(), lift in any::<bool>(),
            dt_ticks in 0.25f32..4.0,
        ) {
            let mut enzyme = Enzyme::new(0.4);
            enzyme.vel = Vec3::new(vx, vy, vz);
            enzyme.heading = heading;
            let controls = Controls {
                forward, reverse, turn_left: left, turn_right: right, lift, drop: false,
            };
            drive(&mut enzyme, &controls, &tuning(), true, SIM_DT * dt_ticks);
            prop_assert!(enzyme.speed() <= tuning().speed_cap + 1e-5);
        }
    }
}
