//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit time step on every update
//! - Seeded RNG only
//! - Stable iteration order (by batch index)
//! - No rendering, DOM or audio dependencies

pub mod ambient;
pub mod autopilot;
pub mod boundary;
pub mod camera;
pub mod input;
pub mod particles;
pub mod session;
pub mod tick;
pub mod tween;
pub mod vehicle;
pub mod wave;

pub use ambient::{AmbientScene, Bubble, DriftParticle};
pub use boundary::{BoundaryHit, reflect_velocity, resolve_boundary};
pub use camera::{CameraMode, ChaseCamera};
pub use input::{Controls, InputState, Key};
pub use particles::{BroadPhase, BruteForce, FoodParticle, ParticleIndex, UniformGrid};
pub use session::{GameEvent, GamePhase, GameSession, SessionRequest};
pub use tick::{GameState, SessionNodes, TickInput, tick};
pub use tween::{Tween, TweenKind, TweenSet};
pub use vehicle::{Enzyme, drive};
pub use wave::{SurfaceMesh, SurfaceVertex, WaveClock, WaveParams};
