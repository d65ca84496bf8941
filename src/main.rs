//! Enzyme Run entry point
//!
//! The web build wires keyboard events and the refresh loop to the
//! simulation; the native build plays a headless demo session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use enzyme_run::Settings;
    use enzyme_run::platform::{FrameLoop, key_from_name};
    use enzyme_run::sim::{GameEvent, GameState, InputState, SessionRequest, TickInput, tick};

    /// Game instance holding all state
    pub struct Game {
        pub state: GameState,
        input: InputState,
        frames: FrameLoop,
        autopilot: bool,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                state: GameState::new(seed, settings),
                input: InputState::new(),
                frames: FrameLoop::new(),
                autopilot: false,
            }
        }

        fn frame(&mut self, time: f64) {
            let Self {
                state,
                input,
                frames,
                autopilot,
            } = self;
            frames.frame(time, |dt| {
                let tick_input = TickInput {
                    controls: input.snapshot(),
                    autopilot: *autopilot,
                };
                tick(state, &tick_input, dt);
            });

            // Audio collaborator is out of scope; cues go to the console
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Consume { points } => log::debug!("cue: consume (+{points})"),
                    GameEvent::CountdownTick(n) => log::info!("cue: countdown {n}"),
                    GameEvent::WallBump => log::debug!("cue: wall bump"),
                    other => log::info!("cue: {other:?}"),
                }
            }
        }
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Run `f` against the live game, if the entry point has run
    pub fn with_game<R>(f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let game = GAME.with(|slot| slot.borrow().clone())?;
        let mut g = game.borrow_mut();
        Some(f(&mut g))
    }

    pub fn request(request: SessionRequest) -> bool {
        with_game(|g| {
            let accepted = g.state.request(request);
            if accepted && matches!(request, SessionRequest::Exit | SessionRequest::Abort) {
                g.input.clear();
            }
            accepted
        })
        .unwrap_or(false)
    }

    /// Edit a copy of the settings; accepted edits go live and persist
    pub fn update_settings(edit: impl FnOnce(&mut Settings) -> bool) -> bool {
        with_game(|g| {
            let mut settings = g.state.settings.clone();
            if !edit(&mut settings) {
                return false;
            }
            settings.save();
            g.state.apply_settings(settings);
            true
        })
        .unwrap_or(false)
    }

    pub fn set_autopilot(on: bool) {
        with_game(|g| {
            g.autopilot = on;
            log::info!("Autopilot: {on}");
        });
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        log::info!("Enzyme Run starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, Settings::load())));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone())?;

        game.borrow_mut().frames.start();
        request_animation_frame(game);

        log::info!("Enzyme Run running!");
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(key) = key_from_name(&event.key()) {
                    game.borrow_mut().input.press(key);
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(key) = key_from_name(&event.key()) {
                    game.borrow_mut().input.release(key);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Focus loss swallows key-up events, so forget everything held
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.clear();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if !g.frames.is_running() {
                return;
            }
            g.frame(time);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start() -> bool {
    wasm_game::request(enzyme_run::sim::SessionRequest::Start)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn begin() -> bool {
    wasm_game::request(enzyme_run::sim::SessionRequest::Begin)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn restart() -> bool {
    wasm_game::request(enzyme_run::sim::SessionRequest::Restart)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn exit() -> bool {
    wasm_game::request(enzyme_run::sim::SessionRequest::Exit)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn abort() -> bool {
    wasm_game::request(enzyme_run::sim::SessionRequest::Abort)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_autopilot(on: bool) {
    wasm_game::set_autopilot(on);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn score() -> f64 {
    wasm_game::with_game(|g| g.state.session.score as f64).unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn consumed() -> u32 {
    wasm_game::with_game(|g| g.state.session.consumed_count).unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn total() -> u32 {
    wasm_game::with_game(|g| g.state.session.total_particles).unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn time_remaining() -> u32 {
    wasm_game::with_game(|g| g.state.session.time_remaining).unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn phase() -> String {
    wasm_game::with_game(|g| g.state.phase().as_str().to_string())
        .unwrap_or_else(|| "idle".to_string())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_quality(name: &str) -> bool {
    let Some(quality) = enzyme_run::QualityPreset::parse(name) else {
        return false;
    };
    wasm_game::update_settings(|s| {
        s.quality = quality;
        true
    })
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_camera_mode(name: &str) -> bool {
    let Some(mode) = enzyme_run::sim::CameraMode::parse(name) else {
        return false;
    };
    wasm_game::update_settings(|s| {
        s.camera_mode = mode;
        true
    })
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_vertical_thrust(on: bool) -> bool {
    wasm_game::update_settings(|s| {
        s.vertical_thrust = on;
        true
    })
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_reduced_motion(on: bool) -> bool {
    wasm_game::update_settings(|s| {
        s.reduced_motion = on;
        true
    })
}

/// Hover text for a scene node as `{"name", "description"}` JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn describe(id: u32) -> Option<String> {
    let descriptor =
        wasm_game::with_game(|g| g.state.catalog.describe(enzyme_run::NodeId(id))).flatten()?;
    serde_json::to_string(&descriptor).ok()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn is_fluid(id: u32) -> bool {
    wasm_game::with_game(|g| g.state.catalog.is_fluid(enzyme_run::NodeId(id))).unwrap_or(false)
}

/// Every registered node as `[[id, kind], ...]` JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn scene_nodes() -> String {
    wasm_game::with_game(|g| serde_json::to_string(&g.state.catalog.entries()).ok())
        .flatten()
        .unwrap_or_else(|| "[]".to_string())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn enzyme_node() -> Option<u32> {
    wasm_game::with_game(|g| g.state.session_nodes.enzyme.map(|id| id.0)).flatten()
}

/// Node ids of the session batch, in the order of `particle_instances`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn particle_nodes() -> Vec<u32> {
    wasm_game::with_game(|g| g.state.session_nodes.particles.iter().map(|id| id.0).collect())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn particle_instances() -> Vec<f32> {
    use enzyme_run::platform::view;
    wasm_game::with_game(|g| view::to_floats(&view::particle_instances(&g.state)))
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn drift_instances() -> Vec<f32> {
    use enzyme_run::platform::view;
    wasm_game::with_game(|g| view::to_floats(&view::drift_instances(&g.state))).unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn bubble_instances() -> Vec<f32> {
    use enzyme_run::platform::view;
    wasm_game::with_game(|g| view::to_floats(&view::bubble_instances(&g.state)))
        .unwrap_or_default()
}

/// `[x, y, z, heading, tilt, light]`, empty without a session
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn enzyme_pose() -> Vec<f32> {
    use enzyme_run::platform::view;
    wasm_game::with_game(|g| view::enzyme_data(&g.state).map(|e| view::to_floats(&[e])))
        .flatten()
        .unwrap_or_default()
}

/// `[eye xyz, direction xyz]`, empty without a session
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn camera_pose() -> Vec<f32> {
    use enzyme_run::platform::view;
    wasm_game::with_game(|g| view::camera_data(&g.state).map(|c| view::to_floats(&[c])))
        .flatten()
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn surface_vertices() -> Vec<u8> {
    wasm_game::with_game(|g| enzyme_run::platform::view::surface_bytes(&g.state).to_vec())
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use enzyme_run::Settings;
    use enzyme_run::consts::SIM_DT;
    use enzyme_run::platform::FrameLoop;
    use enzyme_run::sim::{GameEvent, GamePhase, GameState, SessionRequest, TickInput, tick};

    env_logger::init();
    log::info!("Enzyme Run (native) starting...");
    log::info!("Native mode plays a headless demo session - serve the wasm build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(1);

    let mut state = GameState::new(seed, Settings::load());
    state.request(SessionRequest::Start);
    state.request(SessionRequest::Begin);

    let demo = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut frames = FrameLoop::new();
    frames.start();

    // Simulated 60 Hz refresh, capped well past the session clock
    let frame_ms = f64::from(SIM_DT) * 1000.0;
    let limit = (state.settings.tuning.session.session_seconds
        + state.settings.tuning.session.countdown_seconds
        + 5) as f64
        * 1000.0;
    let mut now = 0.0;
    while !state.phase().is_finished() && now < limit {
        frames.frame(now, |dt| tick(&mut state, &demo, dt));
        for event in state.drain_events() {
            match event {
                GameEvent::Consume { points } => log::debug!("cue: consume (+{points})"),
                GameEvent::WallBump => log::debug!("cue: wall bump"),
                other => log::info!("cue: {other:?}"),
            }
        }
        now += frame_ms;
    }
    frames.stop();

    let session = &state.session;
    let outcome = match session.phase {
        GamePhase::Won => "won",
        GamePhase::Lost => "lost",
        _ => "unfinished",
    };
    println!(
        "Session {outcome}: {}/{} particles, score {}, {}s left",
        session.consumed_count, session.total_particles, session.score, session.time_remaining
    );
}
