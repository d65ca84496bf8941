//! Platform glue shared by the web and native entry points
//!
//! - Frame timing: display-refresh timestamps to fixed simulation steps
//! - Key mapping: browser key names to controller keys
//! - Render snapshots: flat buffers the external renderer draws from

pub mod view;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::input::Key;

/// Fixed-step driver fed with refresh timestamps
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    accumulator: f32,
    last_time: Option<f64>,
    running: bool,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last_time = None;
        self.accumulator = 0.0;
    }

    /// Stop stepping and drop any banked time
    pub fn stop(&mut self) {
        self.running = false;
        self.last_time = None;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run as many fixed steps as the time since the last frame allows
    ///
    /// Returns the number of steps taken. The first frame after `start`
    /// runs a single step.
    pub fn frame(&mut self, now_ms: f64, mut step: impl FnMut(f32)) -> u32 {
        if !self.running {
            return 0;
        }

        let dt = match self.last_time {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => SIM_DT,
        };
        self.last_time = Some(now_ms);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            step(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Never bank more than the substep cap can pay back
        self.accumulator = self.accumulator.min(SIM_DT * MAX_SUBSTEPS as f32);
        substeps
    }
}

/// Map a `KeyboardEvent.key` value to a controller key
pub fn key_from_name(name: &str) -> Option<Key> {
    match name.to_lowercase().as_str() {
        "a" | "arrowleft" => Some(Key::TurnLeft),
        "d" | "arrowright" => Some(Key::TurnRight),
        "w" | "arrowup" => Some(Key::Forward),
        "s" | "arrowdown" => Some(Key::Reverse),
        " " | "space" | "spacebar" => Some(Key::Lift),
        "shift" => Some(Key::Drop),
        _ => None,
    }
}
