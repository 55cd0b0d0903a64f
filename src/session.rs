//! Jam session counters and best-effort telemetry
//!
//! A session accumulates note statistics between `begin` and `end`. Telemetry
//! goes through a send-and-forget port: a failing reporter is logged and
//! ignored, never surfaced to the simulation or audio path.

use serde::Serialize;
use serde_json::json;

use crate::audio::Waveform;
use crate::sim::event::{NoteStruck, Origin};
use crate::sim::geometry::RingSide;

/// Running totals for the current session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    /// Collision-sourced notes only
    pub total_hits: u64,
    /// Every note, any origin
    pub total_notes: u64,
    pub frequency_sum: f64,
}

impl SessionStats {
    pub fn record(&mut self, event: &NoteStruck) {
        self.total_notes += 1;
        self.frequency_sum += event.frequency as f64;
        if event.origin == Origin::Collision {
            self.total_hits += 1;
        }
    }

    /// Mean frequency of all notes, 0 when nothing played
    pub fn avg_frequency(&self) -> f64 {
        if self.total_notes == 0 {
            0.0
        } else {
            self.frequency_sum / self.total_notes as f64
        }
    }
}

/// Kind of telemetry event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Note,
    SpawnBall,
}

/// One telemetry record for the session event log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub session_id: u64,
    pub event_type: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,
    pub payload: serde_json::Value,
}

/// Totals reported when a session closes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: u64,
    pub total_hits: u64,
    pub total_notes: u64,
    pub avg_frequency: f64,
}

/// Send-and-forget telemetry port
///
/// Implementations must not block; the return value is only used for logging.
pub trait TelemetryReporter {
    fn report(&self, event: &SessionEvent) -> anyhow::Result<()>;
    fn end_session(&self, summary: &SessionSummary) -> anyhow::Result<()>;
}

/// Reporter that writes events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl TelemetryReporter for LogReporter {
    fn report(&self, event: &SessionEvent) -> anyhow::Result<()> {
        log::debug!("telemetry: {}", serde_json::to_string(event)?);
        Ok(())
    }

    fn end_session(&self, summary: &SessionSummary) -> anyhow::Result<()> {
        log::info!(
            "Session {} ended: {} notes, {} hits, avg {:.2} Hz",
            summary.session_id,
            summary.total_notes,
            summary.total_hits,
            summary.avg_frequency
        );
        Ok(())
    }
}

/// Session-scoped accumulator plus its telemetry port
pub struct Session {
    id: Option<u64>,
    stats: SessionStats,
    reporter: Box<dyn TelemetryReporter>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Box::new(LogReporter))
    }
}

impl Session {
    pub fn new(reporter: Box<dyn TelemetryReporter>) -> Self {
        Self {
            id: None,
            stats: SessionStats::default(),
            reporter,
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Start a new session; counters restart from zero
    pub fn begin(&mut self, session_id: u64) {
        if let Some(summary) = self.end() {
            log::warn!("Session {} replaced before it was ended", summary.session_id);
        }
        self.id = Some(session_id);
        self.stats = SessionStats::default();
        log::info!("Session {} started", session_id);
    }

    /// Close the session and report its summary; `None` if none was active
    pub fn end(&mut self) -> Option<SessionSummary> {
        let session_id = self.id.take()?;
        let summary = SessionSummary {
            session_id,
            total_hits: self.stats.total_hits,
            total_notes: self.stats.total_notes,
            avg_frequency: self.stats.avg_frequency(),
        };
        if let Err(e) = self.reporter.end_session(&summary) {
            log::debug!("Session summary report failed: {e:#}");
        }
        Some(summary)
    }

    /// Count a played note and report it when a session is active
    pub fn record_note(&mut self, event: &NoteStruck, waveform: Waveform) {
        self.stats.record(event);

        let Some(session_id) = self.id else { return };
        self.send(SessionEvent {
            session_id,
            event_type: EventKind::Note,
            note: Some(event.note.to_string()),
            frequency: Some(event.frequency),
            velocity: Some(event.velocity),
            payload: json!({ "source": event.origin.as_str(), "synth": waveform.as_str() }),
        });
    }

    /// Report a drag-released ball
    pub fn record_spawn(&mut self, ring: RingSide, speed: f32) {
        let Some(session_id) = self.id else { return };
        self.send(SessionEvent {
            session_id,
            event_type: EventKind::SpawnBall,
            note: None,
            frequency: None,
            velocity: Some(speed),
            payload: json!({ "ring": ring.as_str() }),
        });
    }

    fn send(&self, event: SessionEvent) {
        if let Err(e) = self.reporter.report(&event) {
            log::debug!("Telemetry report failed: {e:#}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::FetchReporter;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::*;
    use anyhow::anyhow;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, RequestInit};

    /// Posts telemetry as JSON without awaiting the response
    pub struct FetchReporter {
        event_url: String,
        end_url: String,
    }

    impl FetchReporter {
        pub fn new(event_url: impl Into<String>, end_url: impl Into<String>) -> Self {
            Self {
                event_url: event_url.into(),
                end_url: end_url.into(),
            }
        }
    }

    fn post_json(url: &str, body: String) -> anyhow::Result<()> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
        let headers = Headers::new().map_err(|e| anyhow!("headers: {e:?}"))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| anyhow!("headers: {e:?}"))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let request = window.fetch_with_str_and_init(url, &init);
        let url = url.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(request).await {
                log::debug!("POST {url} failed: {e:?}");
            }
        });
        Ok(())
    }

    impl TelemetryReporter for FetchReporter {
        fn report(&self, event: &SessionEvent) -> anyhow::Result<()> {
            post_json(&self.event_url, serde_json::to_string(event)?)
        }

        fn end_session(&self, summary: &SessionSummary) -> anyhow::Result<()> {
            post_json(&self.end_url, serde_json::to_string(summary)?)
        }
    }
}
