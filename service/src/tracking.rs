//! Anonymous usage tracking.
//!
//! Best-effort, fire-and-forget beacons to an external form endpoint.
//! Tracking must never block a response or surface an error to the user, so
//! [`TrackingSink::send`] is infallible from the caller's point of view:
//! delivery failures are logged at debug and dropped.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tracked user actions. The string forms match the event-type column of the
/// published usage sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackingEvent {
    SearchMp,
    SelectSuggestion,
    SendEmail,
    SendEmailFrench,
    ViewProtestImage,
    ShareCampaign,
}

impl TrackingEvent {
    /// Label written to the tracking sheet.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchMp => "Search MP",
            Self::SelectSuggestion => "Select suggestion",
            Self::SendEmail => "Send email",
            Self::SendEmailFrench => "Send email French",
            Self::ViewProtestImage => "View protest image",
            Self::ShareCampaign => "Share campaign",
        }
    }
}

/// One tracking beacon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRecord {
    pub event: TrackingEvent,
    pub mp_name: Option<String>,
    pub constituency: Option<String>,
}

impl TrackingRecord {
    #[must_use]
    pub const fn new(event: TrackingEvent) -> Self {
        Self {
            event,
            mp_name: None,
            constituency: None,
        }
    }

    #[must_use]
    pub fn with_mp(event: TrackingEvent, mp_name: &str, constituency: &str) -> Self {
        Self {
            event,
            mp_name: Some(mp_name.to_string()),
            constituency: Some(constituency.to_string()),
        }
    }
}

/// Side-effect port for tracking beacons.
///
/// Core resolution and composition logic never talks to the network
/// directly; handlers hold an `Arc<dyn TrackingSink>` and spawn sends.
#[async_trait]
pub trait TrackingSink: Send + Sync {
    /// Deliver one record. Infallible by contract; implementations swallow
    /// and log their own failures.
    async fn send(&self, record: TrackingRecord);
}

/// Posts records as form submissions to the configured endpoint.
pub struct FormTracker {
    client: reqwest::Client,
    endpoint: String,
}

impl FormTracker {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TrackingSink for FormTracker {
    async fn send(&self, record: TrackingRecord) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let mut form: Vec<(&str, String)> = vec![
            ("event", record.event.as_str().to_string()),
            ("timestamp", timestamp),
        ];
        if let Some(name) = record.mp_name {
            form.push(("mpName", name));
        }
        if let Some(constituency) = record.constituency {
            form.push(("constituency", constituency));
        }

        match self.client.post(&self.endpoint).form(&form).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::debug!(status = %response.status(), "tracking beacon rejected");
            }
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(%error, "tracking beacon failed");
            }
        }
    }
}

/// Sink used when tracking is disabled.
pub struct NoopTracker;

#[async_trait]
impl TrackingSink for NoopTracker {
    async fn send(&self, _record: TrackingRecord) {}
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate)]
pub mod mock {
    //! Recording sink for tests.

    use super::{TrackingRecord, TrackingSink};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every beacon instead of sending it.
    #[derive(Default)]
    pub struct RecordingTracker {
        records: Mutex<Vec<TrackingRecord>>,
    }

    impl RecordingTracker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<TrackingRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TrackingSink for RecordingTracker {
        async fn send(&self, record: TrackingRecord) {
            self.records.lock().unwrap().push(record);
        }
    }
}
