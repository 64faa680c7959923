//! Telemetry hits: one page view or one discrete event.

use serde::Serialize;

use super::sink::TelemetrySink;
use crate::core::errors::Result;

/// Ordered string-keyed payload attached to every hit.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A single telemetry occurrence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Hit {
    #[serde(rename = "pageView")]
    PageView { uri: String, properties: Properties },
    #[serde(rename = "event")]
    Event { name: String, properties: Properties },
}

impl Hit {
    #[must_use]
    pub fn page_view(uri: impl Into<String>, properties: Properties) -> Self {
        Self::PageView {
            uri: uri.into(),
            properties,
        }
    }

    #[must_use]
    pub fn event(name: impl Into<String>, properties: Properties) -> Self {
        Self::Event {
            name: name.into(),
            properties,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PageView { .. } => "pageView",
            Self::Event { .. } => "event",
        }
    }

    /// Hand this hit to the sink.
    ///
    /// Both direct and drained delivery go through here, so the sink cannot
    /// tell a buffered hit from an unbuffered one.
    pub fn deliver<S: TelemetrySink + ?Sized>(&self, sink: &S) -> Result<()> {
        match self {
            Self::PageView { uri, properties } => sink.emit_pageview(uri, properties),
            Self::Event { name, properties } => sink.emit_event(name, properties),
        }
    }
}
