//! Engine: owns all simulation state and runs the two cadences
//!
//! Physics (fixed 16 ms) and the sequencer (tempo-derived) each keep their own
//! ticker and are stepped cooperatively from `advance`. Every tick is atomic:
//! it runs to completion, appends its note-struck events to the shared queue,
//! and the queue is drained into the sink before the next tick starts. The
//! render cadence only ever sees `frame()`, a read-only view.

use glam::Vec2;

use crate::audio::{NoteSink, ToneBackend, Waveform};
use crate::clock::Ticker;
use crate::composition::Composition;
use crate::consts::*;
use crate::grid::GridPattern;
use crate::scene::{self, SceneSnapshot};
use crate::sequencer::SequencerClock;
use crate::session::{Session, SessionSummary, TelemetryReporter};
use crate::settings::Settings;
use crate::sim::{
    Ball, BallStore, Note, NoteQueue, NoteStruck, RingSide, Rings, Viewport, physics_tick,
};

/// An in-progress drag gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub ring: RingSide,
    pub start: Vec2,
    pub current: Vec2,
}

impl Drag {
    /// Launch velocity: pull back to shoot forward
    pub fn velocity(&self) -> Vec2 {
        (self.start - self.current) * DRAG_VELOCITY_SCALE
    }
}

/// Read-only view for the render cadence
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub rings: &'a Rings,
    pub balls: &'a [Ball],
    pub grid: &'a GridPattern,
    pub playing_column: Option<usize>,
    pub drag: Option<&'a Drag>,
}

/// Ticks run by one `advance` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Advanced {
    pub physics_ticks: u32,
    pub sequencer_ticks: u32,
}

pub struct Engine {
    viewport: Viewport,
    rings: Rings,
    balls: BallStore,
    grid: GridPattern,
    sequencer: SequencerClock,
    physics: Ticker,
    events: NoteQueue,
    sink: NoteSink,
    session: Session,
    settings: Settings,
    drag: Option<Drag>,
    seed: u64,
}

impl Engine {
    pub fn new(
        viewport: Viewport,
        settings: Settings,
        backend: Box<dyn ToneBackend>,
        reporter: Box<dyn TelemetryReporter>,
        seed: u64,
    ) -> Self {
        log::info!(
            "Engine ready: {}x{} viewport, {} BPM, {} synth",
            viewport.width,
            viewport.height,
            settings.bpm,
            settings.synth_type.as_str()
        );
        Self {
            viewport,
            rings: Rings::for_viewport(viewport),
            balls: BallStore::new(seed),
            grid: GridPattern::new(),
            sequencer: SequencerClock::new(),
            physics: Ticker::new(PHYSICS_INTERVAL_MS),
            events: NoteQueue::new(),
            sink: NoteSink::new(backend),
            session: Session::new(reporter),
            settings,
            drag: None,
            seed,
        }
    }

    // === Accessors ===

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn rings(&self) -> &Rings {
        &self.rings
    }

    pub fn balls(&self) -> &BallStore {
        &self.balls
    }

    pub fn grid(&self) -> &GridPattern {
        &self.grid
    }

    pub fn sequencer(&self) -> &SequencerClock {
        &self.sequencer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            rings: &self.rings,
            balls: self.balls.as_slice(),
            grid: &self.grid,
            playing_column: self.sequencer.playing_column(),
            drag: self.drag.as_ref(),
        }
    }

    // === Cadences ===

    /// Feed elapsed wall time to both cadences and run whatever ticks are due
    pub fn advance(&mut self, elapsed_ms: f64) -> Advanced {
        let physics_ticks = self.physics.advance(elapsed_ms);
        for _ in 0..physics_ticks {
            self.step_physics();
        }

        let sequencer_ticks = self.sequencer.due_ticks(elapsed_ms);
        for _ in 0..sequencer_ticks {
            self.step_sequencer();
        }

        Advanced {
            physics_ticks,
            sequencer_ticks,
        }
    }

    /// One physics tick; returns the number of collisions
    pub fn step_physics(&mut self) -> usize {
        let hits = physics_tick(&mut self.balls, &self.rings, &mut self.events);
        self.flush_events();
        hits
    }

    /// One sequencer tick; returns the number of notes played
    pub fn step_sequencer(&mut self) -> usize {
        let notes = self.sequencer.tick(&self.grid, &mut self.events);
        self.flush_events();
        notes
    }

    fn flush_events(&mut self) {
        // Timbre is read per note so a change applies immediately
        let waveform = self.settings.synth_type;
        for event in self.events.drain() {
            self.sink.trigger(&event, waveform, &mut self.session);
        }
    }

    /// Play a note directly (keyboard/preview)
    pub fn strike(&mut self, note: Note) {
        self.events.push(NoteStruck::manual(note));
        self.flush_events();
    }

    // === Gestures ===

    /// Start a drag if `point` is inside a ring
    pub fn begin_drag(&mut self, point: Vec2) -> bool {
        let Some(ring) = self.rings.ring_containing(point) else {
            return false;
        };
        self.drag = Some(Drag {
            ring,
            start: point,
            current: point,
        });
        true
    }

    pub fn drag_to(&mut self, point: Vec2) {
        if let Some(drag) = &mut self.drag {
            drag.current = point;
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Release the drag, spawning a ball at its start; returns the ball id
    pub fn end_drag(&mut self) -> Option<u32> {
        let drag = self.drag.take()?;
        let vel = drag.velocity();
        let id = self.balls.spawn(drag.start, vel, drag.ring).id;
        self.session.record_spawn(drag.ring, vel.length());
        log::debug!("Spawned ball {} in {} ring", id, drag.ring.as_str());
        Some(id)
    }

    pub fn clear_balls(&mut self) {
        self.balls.clear();
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> bool {
        self.grid.toggle(row, col)
    }

    /// Re-layout the rings; balls keep their pixel positions
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.rings = Rings::for_viewport(viewport);
        log::info!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }

    // === Transport and configuration ===

    pub fn start_sequencer(&mut self) -> bool {
        self.sequencer.start(self.settings.bpm)
    }

    pub fn stop_sequencer(&mut self) -> bool {
        self.sequencer.stop()
    }

    /// Change tempo; a running sequencer is restarted to pick it up
    pub fn set_bpm(&mut self, bpm: f32) {
        if !self.settings.set_bpm(bpm) {
            return;
        }
        if self.sequencer.stop() {
            self.sequencer.start(self.settings.bpm);
        }
    }

    pub fn set_synth_type(&mut self, waveform: Waveform) {
        self.settings.synth_type = waveform;
    }

    // === Session ===

    pub fn begin_session(&mut self, session_id: u64) {
        self.session.begin(session_id);
    }

    pub fn end_session(&mut self) -> Option<SessionSummary> {
        self.session.end()
    }

    // === Persistence ===

    pub fn capture_scene(&self) -> SceneSnapshot {
        scene::capture(&self.balls, self.viewport)
    }

    /// Replace all balls from a persisted scene (malformed → empty)
    pub fn restore_scene(&mut self, value: &serde_json::Value) {
        self.balls = scene::restore_json(value, self.viewport, &self.rings, self.seed);
    }

    pub fn load_composition(&mut self, composition: &Composition) {
        self.grid = composition.grid_pattern();
        self.set_bpm(composition.bpm);
        self.settings.synth_type = composition.synth_type;
        self.restore_scene(&composition.scene);
        log::info!(
            "Composition loaded: {} ({} balls, {} cells)",
            composition.title,
            self.balls.len(),
            self.grid.active_count()
        );
    }

    pub fn capture_composition(&self, title: &str) -> Composition {
        Composition {
            title: title.to_string(),
            bpm: self.settings.bpm,
            synth_type: self.settings.synth_type,
            grid: self.grid.to_rows(),
            scene: serde_json::to_value(self.capture_scene()).unwrap_or_default(),
        }
    }
}
