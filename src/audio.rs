//! Audio trigger sink
//!
//! Turns note-struck events into short enveloped oscillator tones. Everything is
//! synthesized procedurally - no sample files needed. The backend is created
//! lazily and resumed on demand, so a missing or suspended audio device only
//! drops the tone; counters and telemetry still run.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;
use std::str::FromStr;

use crate::session::Session;
use crate::sim::event::NoteStruck;

/// Envelope start/end level (exponential ramps cannot reach zero)
pub const ENVELOPE_FLOOR: f32 = 0.0001;
/// Attack ramp length in seconds
pub const ATTACK_SECS: f32 = 0.02;
/// Oscillator keeps running this long after the release reaches the floor
pub const STOP_TAIL_SECS: f32 = 0.02;
/// Quietest allowed peak gain
pub const MIN_PEAK: f32 = 0.05;
/// Master output gain
pub const MASTER_GAIN: f32 = 0.8;

/// Oscillator timbre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    #[default]
    Triangle,
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            other => Err(format!("unknown synth type '{other}'")),
        }
    }
}

impl Waveform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// Sample at `phase` cycles (only the fractional part matters), range [-1, 1]
    pub fn sample(&self, phase: f32) -> f32 {
        let p = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (p * TAU).sin(),
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * p - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
        }
    }
}

/// One scheduled tone: oscillator + gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub waveform: Waveform,
    /// Envelope peak, reached after the attack
    pub peak: f32,
    /// Time at which the release reaches the floor
    pub duration_secs: f32,
}

impl Tone {
    pub fn from_event(event: &NoteStruck, waveform: Waveform) -> Self {
        Self {
            frequency: event.frequency,
            waveform,
            peak: event.velocity.max(MIN_PEAK),
            duration_secs: event.duration_secs,
        }
    }

    /// Oscillator stop time relative to the tone start
    pub fn stop_secs(&self) -> f32 {
        self.duration_secs + STOP_TAIL_SECS
    }

    /// Envelope gain `t` seconds after the tone starts
    pub fn gain_at(&self, t: f32) -> f32 {
        if t < 0.0 || t >= self.stop_secs() {
            return 0.0;
        }
        if t < ATTACK_SECS {
            return exp_ramp(ENVELOPE_FLOOR, self.peak, t / ATTACK_SECS);
        }
        let release = self.duration_secs - ATTACK_SECS;
        if release > 0.0 && t < self.duration_secs {
            exp_ramp(self.peak, ENVELOPE_FLOOR, (t - ATTACK_SECS) / release)
        } else {
            ENVELOPE_FLOOR
        }
    }
}

/// Exponential interpolation between two positive levels, `x` in [0, 1]
#[inline]
fn exp_ramp(from: f32, to: f32, x: f32) -> f32 {
    from * (to / from).powf(x.clamp(0.0, 1.0))
}

/// Audio output the sink schedules tones on
pub trait ToneBackend {
    /// Create or resume the underlying device; `false` if unavailable
    fn ensure_running(&mut self) -> bool;
    /// Schedule a tone starting now
    fn schedule(&mut self, tone: &Tone);
}

/// Shared backends (the owner keeps a handle to render or inspect)
impl<B: ToneBackend> ToneBackend for Rc<RefCell<B>> {
    fn ensure_running(&mut self) -> bool {
        self.borrow_mut().ensure_running()
    }

    fn schedule(&mut self, tone: &Tone) {
        self.borrow_mut().schedule(tone);
    }
}

/// Consumes note-struck events one at a time
pub struct NoteSink {
    backend: Box<dyn ToneBackend>,
}

impl NoteSink {
    pub fn new(backend: Box<dyn ToneBackend>) -> Self {
        Self { backend }
    }

    /// Sound one event, update session counters, and report it
    pub fn trigger(&mut self, event: &NoteStruck, waveform: Waveform, session: &mut Session) {
        if self.backend.ensure_running() {
            self.backend.schedule(&Tone::from_event(event, waveform));
        } else {
            log::warn!("Audio unavailable, dropping {} tone", event.note);
        }

        session.record_note(event, waveform);
    }
}

#[derive(Debug, Clone)]
struct Voice {
    tone: Tone,
    start: f64,
}

/// Software renderer that mixes tones into a mono buffer
///
/// Used natively where no browser audio context exists.
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    sample_rate: u32,
    time: f64,
    voices: Vec<Voice>,
    suspended: bool,
    scheduled: usize,
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new(44_100)
    }
}

impl OfflineBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            time: 0.0,
            voices: Vec::new(),
            suspended: true,
            scheduled: 0,
        }
    }

    /// Playback clock in seconds
    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Simulate the device being suspended (e.g. lost focus)
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Total tones scheduled since creation
    pub fn scheduled_count(&self) -> usize {
        self.scheduled
    }

    /// Tones not yet finished
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Render `seconds` of audio and advance the clock
    pub fn render(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds * self.sample_rate as f64).round().max(0.0) as usize;
        let dt = 1.0 / self.sample_rate as f64;
        let mut out = Vec::with_capacity(frames);

        for _ in 0..frames {
            let mut mix = 0.0;
            for voice in &self.voices {
                let t = (self.time - voice.start) as f32;
                let gain = voice.tone.gain_at(t);
                if gain > 0.0 {
                    mix += voice.tone.waveform.sample(voice.tone.frequency * t) * gain;
                }
            }
            out.push(mix * MASTER_GAIN);
            self.time += dt;
        }

        let now = self.time;
        self.voices
            .retain(|v| now - v.start < v.tone.stop_secs() as f64);
        out
    }
}

impl ToneBackend for OfflineBackend {
    fn ensure_running(&mut self) -> bool {
        if self.suspended {
            log::debug!("Offline audio resumed at {:.3}s", self.time);
            self.suspended = false;
        }
        true
    }

    fn schedule(&mut self, tone: &Tone) {
        self.voices.push(Voice {
            tone: *tone,
            start: self.time,
        });
        self.scheduled += 1;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::*;
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorType};

    impl Waveform {
        fn oscillator_type(&self) -> OscillatorType {
            match self {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Triangle => OscillatorType::Triangle,
            }
        }
    }

    /// Web Audio output, created on first use
    #[derive(Default)]
    pub struct WebAudioBackend {
        ctx: Option<AudioContext>,
        master: Option<GainNode>,
    }

    impl WebAudioBackend {
        pub fn new() -> Self {
            Self::default()
        }

        fn create() -> Option<(AudioContext, GainNode)> {
            let ctx = AudioContext::new().ok()?;
            let master = ctx.create_gain().ok()?;
            master.gain().set_value(MASTER_GAIN);
            master.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((ctx, master))
        }
    }

    impl ToneBackend for WebAudioBackend {
        fn ensure_running(&mut self) -> bool {
            if self.ctx.is_none() {
                // May fail outside a secure context; retried on the next note
                let Some((ctx, master)) = Self::create() else {
                    log::warn!("Failed to create AudioContext");
                    return false;
                };
                self.ctx = Some(ctx);
                self.master = Some(master);
            }

            let Some(ctx) = &self.ctx else { return false };
            // Browsers start contexts suspended until a user gesture
            if ctx.state() != AudioContextState::Running {
                let _ = ctx.resume();
            }
            true
        }

        fn schedule(&mut self, tone: &Tone) {
            let (Some(ctx), Some(master)) = (&self.ctx, &self.master) else {
                return;
            };
            let (Ok(osc), Ok(gain)) = (ctx.create_oscillator(), ctx.create_gain()) else {
                return;
            };
            let now = ctx.current_time();

            osc.set_type(tone.waveform.oscillator_type());
            osc.frequency().set_value_at_time(tone.frequency, now).ok();

            gain.gain().set_value_at_time(ENVELOPE_FLOOR, now).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(tone.peak, now + ATTACK_SECS as f64)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(ENVELOPE_FLOOR, now + tone.duration_secs as f64)
                .ok();

            if osc.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(master).is_err()
            {
                return;
            }
            osc.start_with_when(now).ok();
            osc.stop_with_when(now + tone.stop_secs() as f64).ok();
        }
    }
}
