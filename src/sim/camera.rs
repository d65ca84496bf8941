//! Third-person chase camera
//!
//! Derived state: recomputed every tick from the enzyme pose. The only
//! smoothing is a linear blend toward the ideal pose; there is no
//! velocity prediction.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::vehicle::Enzyme;
use crate::tuning::CameraTuning;
use crate::{backward_vector, forward_vector, lerp_factor};

/// Where the camera aims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    /// Aim straight at the enzyme
    Follow,
    /// Aim at a smoothed point ahead of the enzyme along its heading
    #[default]
    LookAhead,
}

impl CameraMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "follow" => Some(CameraMode::Follow),
            "lookahead" | "look-ahead" | "look_ahead" => Some(CameraMode::LookAhead),
            _ => None,
        }
    }
}

/// Camera pose trailing the enzyme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseCamera {
    pub position: Vec3,
    pub look_target: Vec3,
    pub mode: CameraMode,
}

impl ChaseCamera {
    /// Pose snapped directly behind the enzyme (session spawn)
    pub fn behind(enzyme: &Enzyme, tuning: &CameraTuning, mode: CameraMode) -> Self {
        Self {
            position: ideal_position(enzyme, tuning),
            look_target: aim_point(enzyme, tuning, mode),
            mode,
        }
    }

    /// Blend toward the ideal pose for this update
    pub fn follow(&mut self, enzyme: &Enzyme, tuning: &CameraTuning, dt: f32) {
        let ideal = ideal_position(enzyme, tuning);
        self.position = self.position.lerp(ideal, lerp_factor(tuning.blend, dt));

        let aim = aim_point(enzyme, tuning, self.mode);
        self.look_target = match self.mode {
            CameraMode::Follow => aim,
            CameraMode::LookAhead => self
                .look_target
                .lerp(aim, lerp_factor(tuning.look_blend, dt)),
        };
    }

    /// Unit view direction (zero if the camera sits on its target)
    pub fn view_direction(&self) -> Vec3 {
        (self.look_target - self.position).normalize_or_zero()
    }
}

/// Trailing pose: behind the enzyme at follow distance, raised by the height offset
pub fn ideal_position(enzyme: &Enzyme, tuning: &CameraTuning) -> Vec3 {
    enzyme.pos + backward_vector(enzyme.heading) * tuning.distance + Vec3::Y * tuning.height
}

fn aim_point(enzyme: &Enzyme, tuning: &CameraTuning, mode: CameraMode) -> Vec3 {
    match mode {
        CameraMode::Follow => enzyme.pos,
        CameraMode::LookAhead => {
            enzyme.pos + forward_vector(enzyme.heading) * tuning.look_ahead
                + Vec3::Y * tuning.look_lift
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_ideal_position_trails_heading() {
        let enzyme = Enzyme::new(0.4);
        let tuning = CameraTuning::default();
        // Facing -Z, so the camera sits on +Z and above
        let ideal = ideal_position(&enzyme, &tuning);
        assert!((ideal - Vec3::new(0.0, 3.0, 6.0)).length() < 1e-5);
    }

    #[test]
    fn test_follow_blends_instead_of_snapping() {
        let mut enzyme = Enzyme::new(0.4);
        let tuning = CameraTuning::default();
        let mut camera = ChaseCamera::behind(&enzyme, &tuning, CameraMode::LookAhead);
        let start = camera.position;

        enzyme.pos = Vec3::new(2.0, 0.0, 0.0);
        camera.follow(&enzyme, &tuning, SIM_DT);

        let ideal = ideal_position(&enzyme, &tuning);
        let expected = start + (ideal - start) * 0.15;
        assert!((camera.position - expected).length() < 1e-5);
        assert!((camera.position - ideal).length() > 1.0);
    }

    #[test]
    fn test_converges_on_stationary_enzyme() {
        let mut enzyme = Enzyme::new(0.4);
        enzyme.heading = 1.0;
        enzyme.pos = Vec3::new(-1.0, 0.5, 2.0);
        let tuning = CameraTuning::default();
        let mut camera = ChaseCamera::behind(&Enzyme::new(0.4), &tuning, CameraMode::LookAhead);
        for _ in 0..300 {
            camera.follow(&enzyme, &tuning, SIM_DT);
        }
        assert!((camera.position - ideal_position(&enzyme, &tuning)).length() < 1e-3);
        let ahead = enzyme.pos + enzyme.forward() * 2.0 + Vec3::Y * 0.5;
        assert!((camera.look_target - ahead).length() < 1e-3);
    }

    #[test]
    fn test_follow_mode_aims_at_enzyme() {
        let mut enzyme = Enzyme::new(0.4);
        let tuning = CameraTuning::default();
        let mut camera = ChaseCamera::behind(&enzyme, &tuning, CameraMode::Follow);
        enzyme.pos = Vec3::new(1.0, 1.0, 1.0);
        camera.follow(&enzyme, &tuning, SIM_DT);
        assert_eq!(camera.look_target, enzyme.pos);
        assert!(camera.view_direction().length() > 0.99);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(CameraMode::parse("Follow"), Some(CameraMode::Follow));
        assert_eq!(CameraMode::parse("look-ahead"), Some(CameraMode::LookAhead));
        assert_eq!(CameraMode::parse("orbit"), None);
    }
}
