//! Shared application state handed to HTTP handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::build_info::BuildInfo;
use crate::composer::EmailTemplates;
use crate::config::CampaignConfig;
use crate::counter::EmailCount;
use crate::protests::Protest;
use crate::resolver::Resolver;
use crate::tracking::TrackingSink;

/// Everything a handler needs; cheap to clone, immutable after startup
/// except for the counter receiver.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub templates: Arc<EmailTemplates>,
    pub protests: Arc<Vec<Protest>>,
    pub tracker: Arc<dyn TrackingSink>,
    pub campaign: CampaignConfig,
    pub email_count: watch::Receiver<EmailCount>,
    pub build_info: BuildInfo,
}
