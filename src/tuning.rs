//! Data-driven game balance
//!
//! Every numeric knob of the simulation lives here so the web build can
//! override it from saved settings. Defaults reproduce the classic handling,
//! expressed per 60 Hz tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::wave::WaveParams;

/// Configuration failures (parsing or validation)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

/// Enzyme handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    /// Yaw change per tick while a turn key is held (radians)
    pub turn_rate: f32,
    pub forward_gain: f32,
    pub reverse_gain: f32,
    /// Lift/drop gain (only when vertical thrust is enabled)
    pub vertical_gain: f32,
    /// Velocity multiplier applied every tick
    pub damping: f32,
    pub speed_cap: f32,
    /// Collision radius of the enzyme
    pub radius: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            turn_rate: TURN_RATE,
            forward_gain: FORWARD_GAIN,
            reverse_gain: REVERSE_GAIN,
            vertical_gain: VERTICAL_GAIN,
            damping: DAMPING,
            speed_cap: SPEED_CAP,
            radius: ENZYME_RADIUS,
        }
    }
}

/// Play volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryTuning {
    pub max_radius: f32,
    pub y_max: f32,
    /// Fraction of vertical speed kept (and inverted) on a floor/ceiling hit
    pub vertical_bounce: f32,
}

impl Default for BoundaryTuning {
    fn default() -> Self {
        Self {
            max_radius: MAX_RADIUS,
            y_max: Y_MAX,
            vertical_bounce: VERTICAL_BOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub distance: f32,
    pub height: f32,
    pub blend: f32,
    pub look_ahead: f32,
    pub look_lift: f32,
    pub look_blend: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            distance: CAMERA_DISTANCE,
            height: CAMERA_HEIGHT,
            blend: CAMERA_BLEND,
            look_ahead: CAMERA_LOOK_AHEAD,
            look_lift: CAMERA_LOOK_LIFT,
            look_blend: CAMERA_LOOK_BLEND,
        }
    }
}

/// Food particle batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub count: u32,
    /// Horizontal spawn radius (kept inside the play volume)
    pub spawn_radius: f32,
    /// Vertical spawn half-range
    pub spawn_y: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_points: u32,
    pub max_points: u32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            count: PARTICLE_COUNT,
            spawn_radius: PARTICLE_SPAWN_RADIUS,
            spawn_y: PARTICLE_SPAWN_Y,
            min_radius: PARTICLE_MIN_RADIUS,
            max_radius: PARTICLE_MAX_RADIUS,
            min_points: PARTICLE_MIN_POINTS,
            max_points: PARTICLE_MAX_POINTS,
        }
    }
}

/// Session clocks and removal animation lengths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub session_seconds: u32,
    pub countdown_seconds: u32,
    pub shrink_ticks: u32,
    pub glow_pulse_ticks: u32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            session_seconds: SESSION_SECONDS,
            countdown_seconds: COUNTDOWN_SECONDS,
            shrink_ticks: SHRINK_TICKS,
            glow_pulse_ticks: GLOW_PULSE_TICKS,
        }
    }
}

/// All gameplay tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub vehicle: VehicleTuning,
    pub boundary: BoundaryTuning,
    pub camera: CameraTuning,
    pub particles: ParticleTuning,
    pub session: SessionTuning,
    pub wave: WaveParams,
}

impl Tuning {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.vehicle;
        require_positive("vehicle.speed_cap", v.speed_cap)?;
        require_positive("vehicle.radius", v.radius)?;
        if !(v.damping > 0.0 && v.damping <= 1.0) {
            return Err(invalid(
                "vehicle.damping",
                format!("must be in (0, 1], got {}", v.damping),
            ));
        }

        let b = &self.boundary;
        require_positive("boundary.max_radius", b.max_radius)?;
        require_positive("boundary.y_max", b.y_max)?;
        if !(0.0..=1.0).contains(&b.vertical_bounce) {
            return Err(invalid(
                "boundary.vertical_bounce",
                format!("must be in [0, 1], got {}", b.vertical_bounce),
            ));
        }

        let c = &self.camera;
        for (field, blend) in [("camera.blend", c.blend), ("camera.look_blend", c.look_blend)] {
            if !(blend > 0.0 && blend <= 1.0) {
                return Err(invalid(field, format!("must be in (0, 1], got {blend}")));
            }
        }

        let p = &self.particles;
        if p.count == 0 {
            return Err(invalid("particles.count", "must spawn at least one particle"));
        }
        require_positive("particles.min_radius", p.min_radius)?;
        if p.max_radius < p.min_radius {
            return Err(invalid("particles.max_radius", "must not be below min_radius"));
        }
        if p.max_points < p.min_points {
            return Err(invalid("particles.max_points", "must not be below min_points"));
        }
        if p.spawn_radius < 0.0 || p.spawn_radius > b.max_radius {
            return Err(invalid(
                "particles.spawn_radius",
                format!("must lie within the play radius {}", b.max_radius),
            ));
        }

        let s = &self.session;
        if s.session_seconds == 0 {
            return Err(invalid("session.session_seconds", "must be at least one second"));
        }
        if s.shrink_ticks == 0 {
            return Err(invalid("session.shrink_ticks", "must be at least one tick"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_reject_damping_above_one() {
        let mut tuning = Tuning::default();
        tuning.vehicle.damping = 1.2;
        match tuning.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "vehicle.damping"),
            other => panic!("expected damping rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_unreachable_spawn_radius() {
        let mut tuning = Tuning::default();
        tuning.particles.spawn_radius = 9.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_reject_empty_batch() {
        let mut tuning = Tuning::default();
        tuning.particles.count = 0;
        assert!(tuning.validate().is_err());
    }
}
