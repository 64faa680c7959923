//! JSON-lines telemetry sink: one envelope per hit.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::capture::{Properties, TelemetrySink};
use crate::core::errors::{DcapError, Result};

#[derive(Serialize)]
#[serde(tag = "type")]
enum Body<'a> {
    #[serde(rename = "pageView")]
    PageView {
        uri: &'a str,
        properties: &'a Properties,
    },
    #[serde(rename = "event")]
    Event {
        name: &'a str,
        properties: &'a Properties,
    },
}

#[derive(Serialize)]
struct Envelope<'a> {
    time: String,
    #[serde(rename = "iKey", skip_serializing_if = "Option::is_none")]
    instrumentation_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(flatten)]
    body: Body<'a>,
}

#[derive(Debug)]
struct Inner<W> {
    writer: W,
    user: Option<String>,
}

/// Writes hits as newline-delimited JSON to any writer.
#[derive(Debug)]
pub struct JsonlSink<W> {
    inner: Mutex<Inner<W>>,
    instrumentation_key: Option<String>,
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(Inner { writer, user: None }),
            instrumentation_key: None,
        }
    }

    #[must_use]
    pub fn with_instrumentation_key(mut self, key: Option<&str>) -> Self {
        self.instrumentation_key = key.map(str::to_string);
        self
    }

    /// Recover the writer, e.g. to inspect an in-memory buffer.
    pub fn into_inner(self) -> W {
        self.inner.into_inner().writer
    }

    fn write(&self, operation: &'static str, body: Body<'_>) -> Result<()> {
        let mut inner = self.inner.lock();
        let envelope = Envelope {
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            instrumentation_key: self.instrumentation_key.as_deref(),
            user: inner.user.as_deref(),
            body,
        };
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');
        inner
            .writer
            .write_all(&line)
            .and_then(|()| inner.writer.flush())
            .map_err(|err| DcapError::Sink {
                sink: "jsonl",
                operation,
                details: err.to_string(),
            })
    }
}

impl<W: Write + Send> TelemetrySink for JsonlSink<W> {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn emit_pageview(&self, uri: &str, properties: &Properties) -> Result<()> {
        self.write("emit_pageview", Body::PageView { uri, properties })
    }

    fn emit_event(&self, name: &str, properties: &Properties) -> Result<()> {
        self.write("emit_event", Body::Event { name, properties })
    }

    fn set_authenticated_user(&self, user_id: &str) -> Result<()> {
        self.inner.lock().user = Some(user_id.to_string());
        Ok(())
    }
}
