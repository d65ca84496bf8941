//! Tick-driven removal animations
//!
//! Tweens are purely visual: a particle is flagged `consumed` the instant
//! it is eaten, and its shrink-and-fade plays out afterwards. Everything
//! is keyed on the simulation tick so replays are exact.

use super::particles::FoodParticle;

/// Upward drift per tick while shrinking
const RISE_PER_TICK: f32 = 0.02;
/// Spin per tick while shrinking (radians)
const SPIN_PER_TICK: f32 = 0.1;
/// Glow multiplier held during the pulse
pub const GLOW_PEAK: f32 = 2.0;

/// What a tween animates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenKind {
    /// Scale and opacity fall to zero, then the particle is hidden
    Shrink {
        particle: usize,
        start_scale: f32,
        start_opacity: f32,
    },
    /// Enzyme light doubles, then returns to normal
    GlowPulse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub kind: TweenKind,
    pub start_tick: u64,
    pub duration: u32,
}

impl Tween {
    /// Fraction complete after the update at `now`; reaches 1.0 on the last tick
    pub fn progress(&self, now: u64) -> f32 {
        let elapsed = now.saturating_sub(self.start_tick) + 1;
        (elapsed as f32 / self.duration.max(1) as f32).min(1.0)
    }

    /// Ticks advanced as of `now`
    fn elapsed(&self, now: u64) -> u32 {
        (now.saturating_sub(self.start_tick) + 1).min(self.duration as u64) as u32
    }
}

/// Live tweens for a session
#[derive(Debug, Clone, Default)]
pub struct TweenSet {
    active: Vec<Tween>,
}

impl TweenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shrink(&mut self, particle: &FoodParticle, index: usize, now: u64, duration: u32) {
        self.active.push(Tween {
            kind: TweenKind::Shrink {
                particle: index,
                start_scale: particle.visual.scale,
                start_opacity: particle.visual.opacity,
            },
            start_tick: now,
            duration,
        });
    }

    /// Start a glow pulse, restarting any pulse already running
    pub fn glow_pulse(&mut self, now: u64, duration: u32) {
        self.active.retain(|t| t.kind != TweenKind::GlowPulse);
        self.active.push(Tween {
            kind: TweenKind::GlowPulse,
            start_tick: now,
            duration,
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every tween without finishing it
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Apply every tween for tick `now`, retiring the finished ones
    pub fn update(&mut self, now: u64, particles: &mut [FoodParticle], glow: &mut f32) {
        self.active.retain(|tween| {
            let t = tween.progress(now);
            let done = t >= 1.0;
            match tween.kind {
                TweenKind::Shrink {
                    particle,
                    start_scale,
                    start_opacity,
                } => {
                    let Some(p) = particles.get_mut(particle) else {
                        return false;
                    };
                    let ticks = tween.elapsed(now) as f32;
                    p.visual.scale = start_scale * (1.0 - t);
                    p.visual.opacity = start_opacity * (1.0 - t);
                    p.visual.rise = RISE_PER_TICK * ticks;
                    p.visual.spin = SPIN_PER_TICK * ticks;
                    if done {
                        p.visual.visible = false;
                    }
                }
                TweenKind::GlowPulse => {
                    *glow = if done { 1.0 } else { GLOW_PEAK };
                }
            }
            !done
        });
    }
}
