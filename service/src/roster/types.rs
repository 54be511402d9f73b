//! Data types for MP roster records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A sitting Member of Parliament.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mp {
    pub first_name: String,
    pub last_name: String,
    /// Full display name (e.g., "Elizabeth May")
    pub full_name: String,
    /// Riding name as published by Elections Canada (may contain em-dashes)
    pub constituency: String,
    pub province: String,
    pub party: String,
    pub email: String,
}

/// An MP returned by the resolver.
///
/// When a postal-code lookup lands in a riding with no roster entry (vacant
/// seat), the designated default contact is substituted and the extra fields
/// record what was actually looked up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMp {
    #[serde(flatten)]
    pub mp: Mp,
    /// True when the default contact was substituted for a vacant seat.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    /// The riding the postal code actually resolved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_constituency: Option<String>,
    /// Normalized postal code that triggered the substitution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl ResolvedMp {
    /// Wrap a roster MP with no fallback metadata.
    #[must_use]
    pub fn direct(mp: Mp) -> Self {
        Self {
            mp,
            is_default: false,
            actual_constituency: None,
            postal_code: None,
        }
    }

    /// Wrap the default contact substituted for a vacant seat.
    #[must_use]
    pub fn fallback(mp: Mp, district: String, postal_code: String) -> Self {
        Self {
            mp,
            is_default: true,
            actual_constituency: Some(district),
            postal_code: Some(postal_code),
        }
    }
}
