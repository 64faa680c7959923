//! Host-facing analytics API: maps application analytics events onto
//! page views and events, and releases them once the user is identified.

pub mod identity;
pub mod insights;

use serde::{Deserialize, Serialize};

use crate::capture::{Properties, TelemetrySink};
use crate::core::config::AppConfig;
use crate::core::errors::Result;

pub use identity::{IdentityApi, StaticIdentity, hash_user_ref};
pub use insights::InsightsAnalytics;

/// Action name the host emits for route changes.
pub const NAVIGATE_ACTION: &str = "navigate";
/// Extension name attached to app-level (not plugin-level) events.
pub const APP_EXTENSION: &str = "App";

/// Where an analytics event originated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsContext {
    pub extension: Option<String>,
    pub plugin_id: String,
    pub route_ref: String,
}

/// One analytics event as produced by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub action: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Properties>,
    #[serde(default)]
    pub context: AnalyticsContext,
}

impl AnalyticsEvent {
    /// App-level navigation events are page views; everything else is an event.
    #[must_use]
    pub fn is_page_view(&self) -> bool {
        self.action == NAVIGATE_ACTION && self.context.extension.as_deref() == Some(APP_EXTENSION)
    }
}

/// Entry point the host application talks to.
pub trait AnalyticsApi: Send + Sync {
    fn capture_event(&self, event: &AnalyticsEvent) -> Result<()>;

    /// One-shot readiness signal: the user's identity is now known.
    fn identify(&self, identity: &dyn IdentityApi) -> Result<()>;

    /// Hits still waiting for [`AnalyticsApi::identify`].
    fn pending_hits(&self) -> usize {
        0
    }

    /// Hits discarded because the capture backlog was full.
    fn dropped_hits(&self) -> u64 {
        0
    }
}

/// Used when no analytics backend is configured.
#[derive(Debug, Default)]
pub struct NoopAnalytics;

impl AnalyticsApi for NoopAnalytics {
    fn capture_event(&self, _event: &AnalyticsEvent) -> Result<()> {
        Ok(())
    }

    fn identify(&self, _identity: &dyn IdentityApi) -> Result<()> {
        Ok(())
    }
}

/// Build the analytics API for `config`, or a no-op when the backend section
/// is absent.
pub fn from_config<S>(config: &AppConfig, sink: S) -> Box<dyn AnalyticsApi>
where
    S: TelemetrySink + 'static,
{
    if config.app.analytics.azure.is_none() {
        tracing::info!("app.analytics.azure not configured; analytics disabled");
        return Box::new(NoopAnalytics);
    }
    Box::new(InsightsAnalytics::new(sink, &config.capture))
}
