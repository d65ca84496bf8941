//! Enzyme Run - steer a digestive enzyme through the stomach and eat every food particle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (vehicle, collisions, session state, wave surface, ambient scene)
//! - `catalog`: Typed scene-node descriptors for hover text
//! - `platform`: Frame driver, browser key mapping and render snapshots
//! - `settings`: Preferences, persisted on the web
//! - `tuning`: Data-driven game balance

pub mod catalog;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use catalog::{Descriptor, NodeId, NodeKind, SceneCatalog};
pub use settings::{QualityPreset, Settings};
pub use tuning::{ConfigError, Tuning};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep; per-tick constants below assume 60 Hz
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by the frame driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Enzyme handling (per 60 Hz tick)
    pub const TURN_RATE: f32 = 0.06;
    pub const FORWARD_GAIN: f32 = 0.025;
    /// Reverse is weaker than forward so it feels like braking
    pub const REVERSE_GAIN: f32 = 0.015;
    pub const VERTICAL_GAIN: f32 = 0.015;
    pub const DAMPING: f32 = 0.94;
    pub const SPEED_CAP: f32 = 0.25;
    pub const ENZYME_RADIUS: f32 = 0.4;

    /// Play volume (open stomach cavity)
    pub const MAX_RADIUS: f32 = 6.0;
    pub const Y_MAX: f32 = 3.0;
    pub const VERTICAL_BOUNCE: f32 = 0.5;

    /// Chase camera
    pub const CAMERA_DISTANCE: f32 = 6.0;
    pub const CAMERA_HEIGHT: f32 = 3.0;
    pub const CAMERA_BLEND: f32 = 0.15;
    pub const CAMERA_LOOK_AHEAD: f32 = 2.0;
    pub const CAMERA_LOOK_LIFT: f32 = 0.5;
    pub const CAMERA_LOOK_BLEND: f32 = 0.2;

    /// Food particles
    pub const PARTICLE_COUNT: u32 = 50;
    pub const PARTICLE_SPAWN_RADIUS: f32 = 5.0;
    pub const PARTICLE_SPAWN_Y: f32 = 3.0;
    pub const PARTICLE_MIN_RADIUS: f32 = 0.2;
    pub const PARTICLE_MAX_RADIUS: f32 = 0.5;
    pub const PARTICLE_MIN_POINTS: u32 = 5;
    pub const PARTICLE_MAX_POINTS: u32 = 14;

    /// Session timing (real-time seconds)
    pub const SESSION_SECONDS: u32 = 60;
    pub const COUNTDOWN_SECONDS: u32 = 3;

    /// Removal animation lengths (ticks)
    pub const SHRINK_TICKS: u32 = 20;
    pub const GLOW_PULSE_TICKS: u32 = 6;

    /// Gastric fluid surface (spans the cup, slightly narrower front to back)
    pub const SURFACE_WIDTH: f32 = 14.0;
    pub const SURFACE_DEPTH: f32 = 12.6;
    /// Wave phase advance per second (0.015 per 60 Hz tick)
    pub const WAVE_SPEED: f32 = 0.9;
    /// Resting height of the fluid surface in the ambient scene
    pub const FLUID_LEVEL: f32 = -2.0;

    /// Ambient scene and enzyme idle animation clock (0.016 per tick)
    pub const AMBIENT_TIME_RATE: f32 = 0.96;
    pub const AMBIENT_PARTICLES: u32 = 150;
    pub const AMBIENT_BUBBLES: u32 = 60;
    /// Half extents of the box drifting particles wrap inside
    pub const DRIFT_HALF_X: f32 = 5.0;
    pub const DRIFT_HALF_Y: f32 = 4.0;
    pub const DRIFT_HALF_Z: f32 = 4.5;
    pub const DRIFT_REBOUND: f32 = 0.8;
}

/// Unit vector the enzyme faces for a given yaw (three.js convention: -Z at yaw 0)
#[inline]
pub fn forward_vector(heading: f32) -> Vec3 {
    Vec3::new(-heading.sin(), 0.0, -heading.cos())
}

/// Unit vector pointing behind the enzyme
#[inline]
pub fn backward_vector(heading: f32) -> Vec3 {
    -forward_vector(heading)
}

/// Outward horizontal unit normal at `pos`, falling back to +X at the axis
#[inline]
pub fn radial_normal(pos: Vec3) -> Vec3 {
    let flat = Vec3::new(pos.x, 0.0, pos.z);
    let distance = flat.length();
    if distance <= f32::EPSILON {
        Vec3::X
    } else {
        flat / distance
    }
}

/// Number of 60 Hz ticks `dt` seconds is worth
#[inline]
pub fn tick_scale(dt: f32) -> f32 {
    dt / consts::SIM_DT
}

/// Convert a per-tick blend factor into one for `dt` seconds
///
/// At `dt == SIM_DT` this returns `factor` unchanged.
#[inline]
pub fn lerp_factor(factor: f32, dt: f32) -> f32 {
    let steps = tick_scale(dt);
    if steps == 1.0 {
        factor
    } else {
        1.0 - (1.0 - factor).powf(steps)
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
