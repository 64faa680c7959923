//! Replays a recorded JSONL session through an [`AnalyticsApi`].
//!
//! Each non-blank line is either `{"identity": "<entity ref>"}`, which fires
//! the readiness signal, or an [`AnalyticsEvent`]. An identity line carries
//! nothing else, so an event that happens to include an `identity` key is
//! still replayed as an event.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsApi, AnalyticsEvent, StaticIdentity};
use crate::core::errors::{DcapError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdentityLine {
    identity: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayRecord {
    Identity(IdentityLine),
    Event(Box<AnalyticsEvent>),
}

/// Counters reported after a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub identities: usize,
    /// Hits still held back because no identity arrived.
    pub pending: usize,
    /// Hits discarded because the capture backlog was full.
    pub dropped: u64,
}

pub fn replay<R: BufRead>(api: &dyn AnalyticsApi, input: R) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|err| DcapError::Runtime {
            details: format!("reading replay input line {}: {err}", index + 1),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReplayRecord =
            serde_json::from_str(&line).map_err(|err| DcapError::Serialization {
                context: "replay input",
                details: format!("line {}: {err}", index + 1),
            })?;
        match record {
            ReplayRecord::Identity(IdentityLine { identity }) => {
                api.identify(&StaticIdentity::new(identity))?;
                summary.identities += 1;
            }
            ReplayRecord::Event(event) => {
                api.capture_event(&event)?;
                summary.events += 1;
            }
        }
    }
    summary.pending = api.pending_hits();
    summary.dropped = api.dropped_hits();
    Ok(summary)
}
