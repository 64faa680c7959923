//! Deferred capture queue.
//!
//! Holds telemetry back while a prerequisite (user identity) is pending and
//! replays it in arrival order once [`CaptureQueue::mark_ready`] fires. After
//! that the queue is a straight pipe to the sink.
//!
//! State lives behind one lock and sink calls happen while it is held, so
//! check-and-append and check-and-drain are atomic even if producers and the
//! readiness callback run on different threads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::hit::{Hit, Properties};
use super::sink::TelemetrySink;
use crate::core::config::CaptureConfig;
use crate::core::errors::Result;

/// Emit a drop warning on the first overflow and then every this many.
const DROP_WARN_EVERY: u64 = 1000;

/// What happened to a recorded hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Sent to the sink immediately.
    Delivered,
    /// Appended to the backlog.
    Deferred,
    /// Backlog full; the hit was discarded.
    Dropped,
}

#[derive(Debug)]
enum CaptureState {
    Deferred(VecDeque<Hit>),
    PassThrough,
}

/// Ordered buffer in front of a [`TelemetrySink`].
#[derive(Debug)]
pub struct CaptureQueue<S> {
    sink: S,
    state: Mutex<CaptureState>,
    max_backlog: Option<usize>,
    dropped: AtomicU64,
}

impl<S: TelemetrySink> CaptureQueue<S> {
    /// Unbounded queue; starts deferred when `deferred` is set.
    pub fn new(sink: S, deferred: bool) -> Self {
        Self::with_max_backlog(sink, deferred, None)
    }

    pub fn with_max_backlog(sink: S, deferred: bool, max_backlog: Option<usize>) -> Self {
        let state = if deferred {
            CaptureState::Deferred(VecDeque::new())
        } else {
            CaptureState::PassThrough
        };
        Self {
            sink,
            state: Mutex::new(state),
            max_backlog,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn from_config(sink: S, config: &CaptureConfig) -> Self {
        Self::with_max_backlog(sink, config.defer, config.max_backlog)
    }

    pub fn record_pageview(
        &self,
        uri: impl Into<String>,
        properties: Properties,
    ) -> Result<Disposition> {
        self.record(Hit::page_view(uri, properties))
    }

    pub fn record_event(
        &self,
        name: impl Into<String>,
        properties: Properties,
    ) -> Result<Disposition> {
        self.record(Hit::event(name, properties))
    }

    /// Buffer the hit while deferred, otherwise deliver it now.
    pub fn record(&self, hit: Hit) -> Result<Disposition> {
        let mut state = self.state.lock();
        match &mut *state {
            CaptureState::PassThrough => {
                hit.deliver(&self.sink)?;
                Ok(Disposition::Delivered)
            }
            CaptureState::Deferred(backlog) => {
                if self.max_backlog.is_some_and(|max| backlog.len() >= max) {
                    self.note_drop(&hit, backlog.len());
                    return Ok(Disposition::Dropped);
                }
                tracing::debug!(kind = hit.kind(), pending = backlog.len() + 1, "deferring hit");
                backlog.push_back(hit);
                Ok(Disposition::Deferred)
            }
        }
    }

    /// Drain the backlog in arrival order and switch to pass-through.
    ///
    /// Returns how many buffered hits were delivered; `0` when already ready.
    /// If the sink fails mid-drain the failing hit is not retried, the rest
    /// stay queued, the queue stays deferred and the error is returned. A
    /// later call resumes from the next undelivered hit.
    pub fn mark_ready(&self) -> Result<usize> {
        let mut state = self.state.lock();
        let CaptureState::Deferred(backlog) = &mut *state else {
            return Ok(0);
        };

        let mut delivered = 0;
        while let Some(hit) = backlog.pop_front() {
            if let Err(err) = hit.deliver(&self.sink) {
                tracing::warn!(
                    sink = self.sink.name(),
                    kind = hit.kind(),
                    delivered,
                    remaining = backlog.len(),
                    error = %err,
                    "drain aborted by sink failure"
                );
                return Err(err);
            }
            delivered += 1;
        }

        *state = CaptureState::PassThrough;
        tracing::info!(sink = self.sink.name(), delivered, "capture ready; backlog drained");
        Ok(delivered)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), CaptureState::PassThrough)
    }

    /// Number of hits waiting in the backlog.
    #[must_use]
    pub fn pending(&self) -> usize {
        match &*self.state.lock() {
            CaptureState::Deferred(backlog) => backlog.len(),
            CaptureState::PassThrough => 0,
        }
    }

    /// Hits discarded because the backlog was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn note_drop(&self, hit: &Hit, pending: usize) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped == 1 || dropped % DROP_WARN_EVERY == 0 {
            tracing::warn!(
                kind = hit.kind(),
                pending,
                dropped,
                "capture backlog full; dropping hit"
            );
        }
    }
}
