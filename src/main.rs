//! Synth Orbit entry point
//!
//! Handles platform-specific initialization and runs the engine loop. The web
//! build drives the engine from `requestAnimationFrame`; the native build runs
//! a headless jam through the offline renderer.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use glam::Vec2;
    use synth_orbit::audio::{WebAudioBackend, Waveform};
    use synth_orbit::session::FetchReporter;
    use synth_orbit::sim::{Note, Viewport};
    use synth_orbit::{Composition, Engine, Settings};

    /// Engine plus frame timing
    struct App {
        engine: Engine,
        last_time: f64,
    }

    thread_local! {
        static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    }

    fn with_engine<R>(f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        APP.with(|app| app.borrow_mut().as_mut().map(|a| f(&mut a.engine)))
    }

    fn canvas_viewport(canvas: &HtmlCanvasElement) -> Viewport {
        let w = canvas.client_width().max(1) as u32;
        let h = canvas.client_height().max(1) as u32;
        canvas.set_width(w);
        canvas.set_height(h);
        Viewport::new(w as f32, h as f32)
    }

    fn event_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            (event.client_x() as f64 - rect.left()) as f32,
            (event.client_y() as f64 - rect.top()) as f32,
        )
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Synth Orbit starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("stage")
            .ok_or("no stage canvas")?
            .dyn_into()?;

        let settings = Settings::load();
        let reporter = FetchReporter::new(
            settings.telemetry_url.clone(),
            settings.session_end_url.clone(),
        );
        let seed = js_sys::Date::now() as u64;
        let engine = Engine::new(
            canvas_viewport(&canvas),
            settings,
            Box::new(WebAudioBackend::new()),
            Box::new(reporter),
            seed,
        );

        APP.with(|app| {
            *app.borrow_mut() = Some(App {
                engine,
                last_time: 0.0,
            })
        });

        setup_input_handlers(&canvas)?;
        request_animation_frame();

        log::info!("Synth Orbit running (seed {})", seed);
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        // Press inside a ring starts a drag
        {
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let point = event_point(&target, &event);
                with_engine(|e| e.begin_drag(point));
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let point = event_point(&target, &event);
                with_engine(|e| e.drag_to(point));
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let point = event_point(&target, &event);
                with_engine(|e| {
                    e.drag_to(point);
                    e.end_drag()
                });
            });
            canvas.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                with_engine(|e| e.cancel_drag());
            });
            canvas.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Resize re-lays out the rings
        {
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let viewport = canvas_viewport(&target);
                with_engine(|e| e.resize(viewport));
            });
            if let Some(window) = web_sys::window() {
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            }
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame() {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            frame_loop(time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(time: f64) {
        APP.with(|app| {
            if let Some(app) = app.borrow_mut().as_mut() {
                let elapsed = if app.last_time > 0.0 { time - app.last_time } else { 0.0 };
                app.last_time = time;
                app.engine.advance(elapsed);
            }
        });
        request_animation_frame();
    }

    // === Controls exported to the page ===

    #[wasm_bindgen]
    pub fn toggle_cell(row: usize, col: usize) -> bool {
        with_engine(|e| e.toggle_cell(row, col)).unwrap_or(false)
    }

    #[wasm_bindgen]
    pub fn start_sequencer() -> bool {
        with_engine(|e| e.start_sequencer()).unwrap_or(false)
    }

    #[wasm_bindgen]
    pub fn stop_sequencer() -> bool {
        with_engine(|e| e.stop_sequencer()).unwrap_or(false)
    }

    #[wasm_bindgen]
    pub fn set_bpm(bpm: f32) {
        with_engine(|e| {
            e.set_bpm(bpm);
            e.settings().save();
        });
    }

    #[wasm_bindgen]
    pub fn set_synth_type(name: &str) -> bool {
        let waveform: Waveform = match name.parse() {
            Ok(waveform) => waveform,
            Err(e) => {
                log::warn!("{}", e);
                return false;
            }
        };
        with_engine(|e| {
            e.set_synth_type(waveform);
            e.settings().save();
        })
        .is_some()
    }

    #[wasm_bindgen]
    pub fn clear_balls() {
        with_engine(|e| e.clear_balls());
    }

    #[wasm_bindgen]
    pub fn strike(name: &str) {
        if let Some(note) = Note::from_name(name) {
            with_engine(|e| e.strike(note));
        }
    }

    #[wasm_bindgen]
    pub fn begin_session(session_id: f64) {
        with_engine(|e| e.begin_session(session_id as u64));
    }

    #[wasm_bindgen]
    pub fn end_session() {
        with_engine(|e| e.end_session());
    }

    /// Load a composition from JSON; `false` if it does not parse
    #[wasm_bindgen]
    pub fn load_composition(json: &str) -> bool {
        match serde_json::from_str::<Composition>(json) {
            Ok(composition) => with_engine(|e| e.load_composition(&composition)).is_some(),
            Err(e) => {
                log::warn!("Rejected composition: {}", e);
                false
            }
        }
    }

    #[wasm_bindgen]
    pub fn load_demo() {
        with_engine(|e| e.load_composition(&Composition::demo()));
    }

    #[wasm_bindgen]
    pub fn capture_composition(title: &str) -> String {
        with_engine(|e| serde_json::to_string(&e.capture_composition(title)).ok())
            .flatten()
            .unwrap_or_default()
    }

    /// Current frame as JSON for the page's drawing code
    #[wasm_bindgen]
    pub fn frame_json() -> String {
        with_engine(|e| {
            let frame = e.frame();
            let ring = |r: &synth_orbit::sim::Ring| {
                serde_json::json!({ "x": r.center.x, "y": r.center.y, "radius": r.radius })
            };
            let balls: Vec<_> = frame
                .balls
                .iter()
                .map(|b| {
                    serde_json::json!({
                        "x": b.pos.x,
                        "y": b.pos.y,
                        "radius": b.radius,
                        "color": b.color.hex(),
                    })
                })
                .collect();
            let drag = frame.drag.map(|d| {
                serde_json::json!({
                    "start": [d.start.x, d.start.y],
                    "current": [d.current.x, d.current.y],
                })
            });
            serde_json::json!({
                "left": ring(&frame.rings.left),
                "right": ring(&frame.rings.right),
                "balls": balls,
                "grid": frame.grid.to_rows(),
                "playingColumn": frame.playing_column,
                "drag": drag,
            })
            .to_string()
        })
        .unwrap_or_default()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Synth Orbit (native) starting...");

    let seconds = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(8.0);

    headless_jam(seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play the demo composition through the offline renderer and log levels
#[cfg(not(target_arch = "wasm32"))]
fn headless_jam(seconds: f64) {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use synth_orbit::audio::OfflineBackend;
    use synth_orbit::session::LogReporter;
    use synth_orbit::sim::Viewport;
    use synth_orbit::{Composition, Engine, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let settings = Settings::load();
    let backend = Rc::new(RefCell::new(OfflineBackend::default()));
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut engine = Engine::new(
        Viewport::default(),
        settings,
        Box::new(backend.clone()),
        Box::new(LogReporter),
        seed,
    );

    engine.begin_session(seed);
    engine.load_composition(&Composition::demo());
    engine.start_sequencer();

    // Flick one extra ball out of the right ring
    let center = engine.rings().right.center;
    if engine.begin_drag(center) {
        engine.drag_to(center + Vec2::new(40.0, 55.0));
        engine.end_drag();
    }

    let frames = (seconds * 1000.0 / FRAME_MS).ceil() as u64;
    let mut peak = 0.0f32;
    let mut sum_sq = 0.0f64;
    let mut samples = 0usize;

    for _ in 0..frames {
        engine.advance(FRAME_MS);
        for s in backend.borrow_mut().render(FRAME_MS / 1000.0) {
            peak = peak.max(s.abs());
            sum_sq += (s as f64) * (s as f64);
            samples += 1;
        }
    }

    let rms = if samples > 0 { (sum_sq / samples as f64).sqrt() } else { 0.0 };
    log::info!(
        "Rendered {:.1}s: {} tones, peak {:.3}, rms {:.4}",
        seconds,
        backend.borrow().scheduled_count(),
        peak,
        rms
    );

    if let Some(summary) = engine.end_session() {
        match serde_json::to_string(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("Could not encode summary: {e}"),
        }
    }
}
