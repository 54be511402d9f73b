//! Upcoming protest listings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One upcoming protest shown in the side drawer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Protest {
    pub id: u32,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Poster image path, shown in the lightbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Protest fixture file shape, also the list response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProtestList {
    #[serde(default)]
    pub protests: Vec<Protest>,
}
