//! Per-frame simulation tick
//!
//! Runs the stages in a fixed order; later stages read what earlier ones
//! wrote this tick: input, vehicle, boundary, camera, consumption, state
//! machine, tweens and idle float, then the ambient scene and the fluid
//! surface.

use super::ambient::AmbientScene;
use super::autopilot;
use super::input::Controls;
use super::session::{GameEvent, GamePhase, GameSession, SessionRequest};
use super::wave::{SurfaceMesh, WaveClock};
use crate::catalog::{NodeId, NodeKind, SceneCatalog};
use crate::consts::{SURFACE_DEPTH, SURFACE_WIDTH};
use crate::settings::Settings;

/// Scene fixtures registered once per game
const FIXTURES: [NodeKind; 6] = [
    NodeKind::StomachWall,
    NodeKind::StomachLining,
    NodeKind::Rugae,
    NodeKind::GastricFluid,
    NodeKind::FluidSurface,
    NodeKind::FluidVolume,
];

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Held keys, snapshotted at the top of the tick
    pub controls: Controls,
    /// Idle/demo mode: the autopilot drives instead of the keys
    pub autopilot: bool,
}

/// Catalog ids of the live session's entities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionNodes {
    pub enzyme: Option<NodeId>,
    /// Index-aligned with the session batch
    pub particles: Vec<NodeId>,
}

/// Root of everything the frame loop mutates
#[derive(Debug, Clone)]
pub struct GameState {
    pub session: GameSession,
    pub surface: SurfaceMesh,
    pub wave_clock: WaveClock,
    pub ambient: AmbientScene,
    pub catalog: SceneCatalog,
    pub session_nodes: SessionNodes,
    pub settings: Settings,
    /// Simulation ticks since construction (tween clock)
    pub tick_count: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64, settings: Settings) -> Self {
        let mut surface = SurfaceMesh::grid(
            SURFACE_WIDTH,
            SURFACE_DEPTH,
            settings.quality.surface_segments(),
        );
        surface.update(&settings.tuning.wave, 0.0);

        let mut catalog = SceneCatalog::new();
        for kind in FIXTURES {
            catalog.register(kind);
        }
        let ambient = AmbientScene::spawn(seed, &mut catalog);
        log::debug!("Scene catalog holds {} nodes", catalog.len());

        Self {
            session: GameSession::new(seed),
            surface,
            wave_clock: WaveClock::default(),
            ambient,
            catalog,
            session_nodes: SessionNodes::default(),
            settings,
            tick_count: 0,
            events: Vec::new(),
        }
    }

    /// Forward a host request to the session state machine
    pub fn request(&mut self, request: SessionRequest) -> bool {
        let accepted = self
            .session
            .request(request, &self.settings, &mut self.events);
        // Begin keeps the batch; every other transition swaps or drops it
        if accepted && request != SessionRequest::Begin {
            self.sync_session_nodes();
        }
        accepted
    }

    /// Re-register the session's enzyme and particles in the catalog
    fn sync_session_nodes(&mut self) {
        let old = std::mem::take(&mut self.session_nodes);
        for id in old.enzyme.into_iter().chain(old.particles) {
            self.catalog.remove(id);
        }
        if self.session.enzyme.is_some() {
            self.session_nodes.enzyme = Some(self.catalog.register(NodeKind::Enzyme));
        }
        self.session_nodes.particles = (0..self.session.particles.len())
            .map(|_| self.catalog.register(NodeKind::FoodParticle))
            .collect();
    }

    /// Swap settings; a new quality preset rebuilds the surface grid
    ///
    /// Vehicle, boundary, camera, wave and removal-tween tuning apply from
    /// the next tick. Batch, clock and vertical-thrust spawn rules apply
    /// from the next session start.
    pub fn apply_settings(&mut self, settings: Settings) {
        let segments = settings.quality.surface_segments();
        if segments != self.surface.segments() {
            self.surface = SurfaceMesh::grid(SURFACE_WIDTH, SURFACE_DEPTH, segments);
            self.surface
                .update(&settings.tuning.wave, self.wave_clock.time);
        }
        if let Some(camera) = self.session.camera.as_mut() {
            camera.mode = settings.camera_mode;
        }
        self.settings = settings;
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Take every cue emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Advance the game by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !(dt > 0.0 && dt.is_finite()) {
        return;
    }
    let now = state.tick_count;
    let settings = &state.settings;
    let session = &mut state.session;
    let events = &mut state.events;

    let controls = match session.enzyme.as_ref() {
        Some(enzyme) if input.autopilot => autopilot::steer(enzyme, &session.particles),
        _ => input.controls,
    };
    let was_thrusting = session.enzyme.as_ref().is_some_and(|e| e.thrusting);

    session.drive(&controls, settings, dt, events);
    session.follow_camera(&settings.tuning, dt);
    session.consume(now, &settings.tuning, events);
    session.advance(dt, &settings.tuning, events);
    session.animate(now, dt);

    // Thrust cues; leaving the active phase always silences the engine
    let active = session.phase == GamePhase::Active;
    if let Some(enzyme) = session.enzyme.as_mut() {
        if !active {
            enzyme.thrusting = false;
        }
        match (was_thrusting, enzyme.thrusting) {
            (false, true) => events.push(GameEvent::ThrustStarted),
            (true, false) => events.push(GameEvent::ThrustStopped),
            _ => {}
        }
    }

    if !settings.reduced_motion {
        state.ambient.update(dt);
        state.wave_clock.advance(dt);
        state
            .surface
            .update(&settings.tuning.wave, state.wave_clock.time);
    }

    state.tick_count += 1;
}
