// Push event stream from the scoring engine.
//
// The engine exposes a long-lived HTTP endpoint that emits one JSON object
// per line as things happen: flag submissions and team timeline changes.
// The stream ending — cleanly or not — is terminal for the daemon; the
// process restarts rather than reconnecting in place.

use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::pin::Pin;
use tracing::{debug, warn};

use super::client::ScoringClient;
use crate::error::ApiError;

/// A typed event from the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A flag was submitted. `flag_type` is "valid" for scoring submissions.
    Flags { flag_type: String },
    /// The team roster changed.
    Timeline { change: TimelineChange },
    /// An event type this version doesn't know about. Skipped.
    Other(String),
}

/// What changed in the team roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineChange {
    TeamAdded,
    TeamRemoved,
    TeamUpdated,
    Other,
}

// Wire shapes. Unknown or absent fields decode to defaults rather than
// failing the stream; a single malformed line is skipped, not fatal.
#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        match raw.kind.as_str() {
            "flags" => Event::Flags {
                flag_type: raw.metadata.kind,
            },
            "timeline" => Event::Timeline {
                change: match raw.metadata.kind.as_str() {
                    "team-added" => TimelineChange::TeamAdded,
                    "team-removed" => TimelineChange::TeamRemoved,
                    "team-updated" => TimelineChange::TeamUpdated,
                    _ => TimelineChange::Other,
                },
            },
            _ => Event::Other(raw.kind),
        }
    }
}

/// Pull-based reader over the newline-delimited event body.
pub struct EventStream {
    body: Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>,
    buf: Vec<u8>,
}

impl EventStream {
    /// Read the next event. `Ok(None)` means the engine closed the stream.
    pub async fn next(&mut self) -> Result<Option<Event>, ApiError> {
        loop {
            // Drain complete lines already buffered.
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line[..line.len() - 1]);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<RawEvent>(line) {
                    Ok(raw) => {
                        let event = Event::from(raw);
                        debug!(?event, "scoring event");
                        return Ok(Some(event));
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed event line");
                        continue;
                    }
                }
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(ApiError::Transport(e)),
                None => return Ok(None),
            }
        }
    }
}

impl ScoringClient {
    /// Open the live event stream.
    pub async fn events(&self) -> Result<EventStream, ApiError> {
        let response = self.get_stream("/events").await?;
        let body = response.bytes_stream().map(|r| r.map(|b| b.to_vec()));
        Ok(EventStream {
            body: Box::pin(body),
            buf: Vec::new(),
        })
    }
}
