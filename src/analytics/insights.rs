//! Application Insights style analytics adapter over a [`CaptureQueue`].

use serde_json::Value;

use super::identity::{IdentityApi, hash_user_ref};
use super::{APP_EXTENSION, AnalyticsApi, AnalyticsEvent};
use crate::capture::{CaptureQueue, Properties, TelemetrySink};
use crate::core::config::CaptureConfig;
use crate::core::errors::Result;

/// Forwards analytics events to a sink, holding them back until the user has
/// been identified so every hit carries the anonymized user id.
#[derive(Debug)]
pub struct InsightsAnalytics<S> {
    capture: CaptureQueue<S>,
}

impl<S: TelemetrySink> InsightsAnalytics<S> {
    pub fn new(sink: S, config: &CaptureConfig) -> Self {
        Self {
            capture: CaptureQueue::from_config(sink, config),
        }
    }

    #[must_use]
    pub const fn capture(&self) -> &CaptureQueue<S> {
        &self.capture
    }
}

impl<S: TelemetrySink> AnalyticsApi for InsightsAnalytics<S> {
    fn capture_event(&self, event: &AnalyticsEvent) -> Result<()> {
        if event.is_page_view() {
            let mut properties = Properties::new();
            properties.insert(
                "pluginId".to_string(),
                Value::String(event.context.plugin_id.clone()),
            );
            properties.insert(
                "routeRef".to_string(),
                Value::String(event.context.route_ref.clone()),
            );
            self.capture
                .record_pageview(event.subject.clone(), properties)?;
            return Ok(());
        }

        let category = event
            .context
            .extension
            .clone()
            .filter(|extension| !extension.is_empty())
            .unwrap_or_else(|| APP_EXTENSION.to_string());

        let mut properties = Properties::new();
        properties.insert("category".to_string(), Value::String(category));
        properties.insert("label".to_string(), Value::String(event.subject.clone()));
        if let Some(attributes) = &event.attributes {
            properties.insert("attributes".to_string(), Value::Object(attributes.clone()));
        }
        if let Some(value) = &event.value {
            properties.insert("value".to_string(), Value::Number(value.clone()));
        }
        self.capture.record_event(event.action.clone(), properties)?;
        Ok(())
    }

    fn identify(&self, identity: &dyn IdentityApi) -> Result<()> {
        let entity_ref = identity.user_entity_ref()?;
        let user_id = hash_user_ref(&entity_ref);
        self.capture.sink().set_authenticated_user(&user_id)?;
        let drained = self.capture.mark_ready()?;
        tracing::info!(drained, "user identified; capture released");
        Ok(())
    }

    fn pending_hits(&self) -> usize {
        self.capture.pending()
    }

    fn dropped_hits(&self) -> u64 {
        self.capture.dropped()
    }
}
