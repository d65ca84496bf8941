//! Game session and its state machine
//!
//! One `GameSession` owns everything a run of the mini-game mutates:
//! counters, the enzyme, the particle batch, the camera, tweens and the
//! two real-time clocks. Host requests and the per-tick stages all go
//! through it, so nothing lives in ambient state.

use serde::{Deserialize, Serialize};

use super::boundary::resolve_boundary;
use super::camera::ChaseCamera;
use super::input::Controls;
use super::particles::{FoodParticle, ParticleIndex, consume_overlapping, spawn_batch};
use super::tween::TweenSet;
use super::vehicle::{Enzyme, drive};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session; only the ambient scene animates
    #[default]
    Idle,
    /// Fresh batch spawned, waiting for the player to confirm
    Starting,
    /// Timed lead-in before control is handed over
    Countdown,
    /// Session clock running, enzyme under player control
    Active,
    /// Every particle consumed in time
    Won,
    /// Clock ran out first
    Lost,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Starting => "starting",
            GamePhase::Countdown => "countdown",
            GamePhase::Active => "active",
            GamePhase::Won => "won",
            GamePhase::Lost => "lost",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Requests raised by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionRequest {
    Start,
    Begin,
    Restart,
    Exit,
    /// Leave from any non-idle phase
    Abort,
}

/// Fire-and-forget cues for audio and UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Consume { points: u32 },
    Win,
    Lose,
    /// Seconds left in the countdown (3, 2, 1)
    CountdownTick(u32),
    ThrustStarted,
    ThrustStopped,
    /// The enzyme bounced off the cavity wall, floor or ceiling
    WallBump,
}

/// Whole-second countdown fed with elapsed real time
///
/// Disarmed timers ignore time entirely, so a cancelled clock can never
/// fire into a later session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondTimer {
    remaining: u32,
    carry: f32,
    armed: bool,
}

impl SecondTimer {
    pub fn arm(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.carry = 0.0;
        self.armed = seconds > 0;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.carry = 0.0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Feed `dt` seconds; returns how many whole seconds elapsed
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.armed {
            return 0;
        }
        self.carry += dt.max(0.0);
        let mut fired = 0;
        while self.carry >= 1.0 && self.remaining > 0 {
            self.carry -= 1.0;
            self.remaining -= 1;
            fired += 1;
        }
        if self.remaining == 0 {
            self.armed = false;
        }
        fired
    }
}

/// Everything one play-through owns
#[derive(Debug, Clone)]
pub struct GameSession {
    pub phase: GamePhase,
    pub score: u64,
    pub consumed_count: u32,
    pub total_particles: u32,
    /// Whole seconds left on the session clock
    pub time_remaining: u32,
    pub enzyme: Option<Enzyme>,
    pub particles: Vec<FoodParticle>,
    pub camera: Option<ChaseCamera>,
    pub tweens: TweenSet,
    index: ParticleIndex,
    countdown: SecondTimer,
    clock: SecondTimer,
    seed: u64,
    sessions_started: u64,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            consumed_count: 0,
            total_particles: 0,
            time_remaining: 0,
            enzyme: None,
            particles: Vec::new(),
            camera: None,
            tweens: TweenSet::new(),
            index: ParticleIndex::default(),
            countdown: SecondTimer::default(),
            clock: SecondTimer::default(),
            seed,
            sessions_started: 0,
        }
    }

    /// Seed of the batch currently in play
    pub fn batch_seed(&self) -> u64 {
        self.seed.wrapping_add(self.sessions_started)
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.is_armed().then(|| self.countdown.remaining())
    }

    /// Apply a host request; returns whether it caused a transition
    ///
    /// Requests that are not valid in the current phase are ignored.
    pub fn request(
        &mut self,
        request: SessionRequest,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        use GamePhase::*;
        use SessionRequest::*;

        match (self.phase, request) {
            (Idle, Start) | (Won | Lost, Restart) => {
                self.prepare(settings);
                true
            }
            (Starting, Begin) => {
                let seconds = settings.tuning.session.countdown_seconds;
                if seconds == 0 {
                    self.enter_active(&settings.tuning);
                } else {
                    self.countdown.arm(seconds);
                    self.phase = Countdown;
                    events.push(GameEvent::CountdownTick(seconds));
                    log::info!("Countdown started ({seconds}s)");
                }
                true
            }
            (Won | Lost, Exit) | (Starting | Countdown | Active | Won | Lost, Abort) => {
                // The enzyme goes away with the session; silence its engine first
                if self.enzyme.as_ref().is_some_and(|e| e.thrusting) {
                    events.push(GameEvent::ThrustStopped);
                }
                self.teardown();
                true
            }
            _ => {
                log::debug!("Ignoring {:?} while {}", request, self.phase.as_str());
                false
            }
        }
    }

    /// Reset counters and spawn a fresh batch, entering `Starting`
    fn prepare(&mut self, settings: &Settings) {
        let tuning = &settings.tuning;
        self.sessions_started = self.sessions_started.wrapping_add(1);
        self.countdown.cancel();
        self.clock.cancel();
        self.tweens.clear();

        // Without lift/drop the enzyme stays at y = 0, so keep the batch in reach
        let mut batch = tuning.particles.clone();
        if !settings.vertical_thrust {
            batch.spawn_y = batch.spawn_y.min(tuning.vehicle.radius * 0.5);
        }
        self.particles = spawn_batch(self.batch_seed(), &batch);
        self.index = ParticleIndex::for_batch(
            &self.particles,
            tuning.vehicle.radius,
            tuning.particles.max_radius,
        );
        let enzyme = Enzyme::new(tuning.vehicle.radius);
        self.camera = Some(ChaseCamera::behind(
            &enzyme,
            &tuning.camera,
            settings.camera_mode,
        ));
        self.enzyme = Some(enzyme);

        self.score = 0;
        self.consumed_count = 0;
        self.total_particles = self.particles.len() as u32;
        self.time_remaining = tuning.session.session_seconds;
        self.phase = GamePhase::Starting;

        log::info!(
            "Session {} ready: {} particles, seed {}",
            self.sessions_started,
            self.total_particles,
            self.batch_seed()
        );
    }

    fn enter_active(&mut self, tuning: &Tuning) {
        self.countdown.cancel();
        self.time_remaining = tuning.session.session_seconds;
        self.clock.arm(self.time_remaining);
        self.phase = GamePhase::Active;
        log::info!("Session active ({}s)", self.time_remaining);
    }

    /// Back to idle, dropping every session object
    fn teardown(&mut self) {
        self.countdown.cancel();
        self.clock.cancel();
        self.tweens.clear();
        self.enzyme = None;
        self.camera = None;
        self.particles.clear();
        self.index = ParticleIndex::default();
        log::info!("Session closed from {}", self.phase.as_str());
        self.phase = GamePhase::Idle;
    }

    fn finish(&mut self, outcome: GamePhase, events: &mut Vec<GameEvent>) {
        self.countdown.cancel();
        self.clock.cancel();
        self.phase = outcome;
        if outcome == GamePhase::Won {
            events.push(GameEvent::Win);
            log::info!(
                "Won with {}s left, score {}",
                self.time_remaining,
                self.score
            );
        } else {
            events.push(GameEvent::Lose);
            log::info!(
                "Lost: {}/{} consumed, score {}",
                self.consumed_count,
                self.total_particles,
                self.score
            );
        }
    }

    /// Vehicle and boundary stages; only the active phase moves the enzyme
    pub fn drive(
        &mut self,
        controls: &Controls,
        settings: &Settings,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase != GamePhase::Active {
            return;
        }
        let Some(enzyme) = self.enzyme.as_mut() else {
            return;
        };
        drive(
            enzyme,
            controls,
            &settings.tuning.vehicle,
            settings.vertical_thrust,
            dt,
        );
        let hit = resolve_boundary(&mut enzyme.pos, &mut enzyme.vel, &settings.tuning.boundary);
        if hit.any() {
            events.push(GameEvent::WallBump);
        }
    }

    pub fn follow_camera(&mut self, tuning: &Tuning, dt: f32) {
        if let (Some(camera), Some(enzyme)) = (self.camera.as_mut(), self.enzyme.as_ref()) {
            camera.follow(enzyme, &tuning.camera, dt);
        }
    }

    /// Consumption stage: score every particle the enzyme overlaps
    pub fn consume(&mut self, now: u64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Active {
            return;
        }
        let Some(enzyme) = self.enzyme.as_ref() else {
            return;
        };

        let mut eaten = Vec::new();
        consume_overlapping(
            enzyme,
            &mut self.particles,
            &self.index,
            tuning.particles.max_radius,
            &mut eaten,
        );

        for hit in eaten {
            self.score += u64::from(hit.points);
            self.consumed_count += 1;
            self.tweens.shrink(
                &self.particles[hit.index],
                hit.index,
                now,
                tuning.session.shrink_ticks,
            );
            self.tweens
                .glow_pulse(now, tuning.session.glow_pulse_ticks);
            events.push(GameEvent::Consume { points: hit.points });
            log::debug!(
                "Consumed particle {} (+{}), {}/{}",
                hit.particle_id,
                hit.points,
                self.consumed_count,
                self.total_particles
            );
        }
    }

    /// State machine stage: timed transitions and the win/lose checks
    pub fn advance(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        match self.phase {
            GamePhase::Countdown => {
                for _ in 0..self.countdown.advance(dt) {
                    let left = self.countdown.remaining();
                    if left > 0 {
                        events.push(GameEvent::CountdownTick(left));
                    } else {
                        self.enter_active(tuning);
                        break;
                    }
                }
            }
            GamePhase::Active => {
                // A clear on the final second still counts as a win
                if self.consumed_count >= self.total_particles {
                    self.finish(GamePhase::Won, events);
                    return;
                }
                self.clock.advance(dt);
                self.time_remaining = self.clock.remaining();
                if self.time_remaining == 0 {
                    self.finish(GamePhase::Lost, events);
                }
            }
            _ => {}
        }
    }

    /// Tween stage, plus the enzyme's idle float in every phase it exists
    pub fn animate(&mut self, now: u64, dt: f32) {
        let Some(enzyme) = self.enzyme.as_mut() else {
            return;
        };
        enzyme.idle_float(dt);
        self.tweens.update(now, &mut self.particles, &mut enzyme.glow);
    }
}
