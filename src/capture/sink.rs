//! Outbound contract to a telemetry backend.

use std::sync::Arc;

use super::hit::Properties;
use crate::core::errors::Result;

/// A backend that accepts page views and events.
///
/// Calls are synchronous from the caller's point of view. An implementation
/// may hand the payload off to its own background machinery, but any error it
/// returns here propagates straight to whoever recorded the hit.
///
/// The capture queue holds its state lock while calling into the sink, and
/// that lock is not reentrant. A sink must never record into, or mark ready,
/// the queue that feeds it; doing so deadlocks.
pub trait TelemetrySink: Send + Sync {
    /// Short name for logs and error messages.
    fn name(&self) -> &'static str;

    fn emit_pageview(&self, uri: &str, properties: &Properties) -> Result<()>;

    fn emit_event(&self, name: &str, properties: &Properties) -> Result<()>;

    /// Attach an already-anonymized user id to subsequent telemetry.
    fn set_authenticated_user(&self, _user_id: &str) -> Result<()> {
        Ok(())
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn emit_pageview(&self, uri: &str, properties: &Properties) -> Result<()> {
        (**self).emit_pageview(uri, properties)
    }

    fn emit_event(&self, name: &str, properties: &Properties) -> Result<()> {
        (**self).emit_event(name, properties)
    }

    fn set_authenticated_user(&self, user_id: &str) -> Result<()> {
        (**self).set_authenticated_user(user_id)
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for &S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn emit_pageview(&self, uri: &str, properties: &Properties) -> Result<()> {
        (**self).emit_pageview(uri, properties)
    }

    fn emit_event(&self, name: &str, properties: &Properties) -> Result<()> {
        (**self).emit_event(name, properties)
    }

    fn set_authenticated_user(&self, user_id: &str) -> Result<()> {
        (**self).set_authenticated_user(user_id)
    }
}
