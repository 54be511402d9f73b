//! Startup fixture loading.
//!
//! The roster, email templates, and protest list are static JSON files read
//! once at startup. The loads are independent; a failed load is logged and
//! that dataset stays empty so the rest of the service keeps working.

use std::path::Path;

use crate::composer::EmailTemplates;
use crate::protests::{Protest, ProtestList};
use crate::roster::Mp;

fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(%error, path = %path.display(), "failed to parse {what} fixture");
                T::default()
            }
        },
        Err(error) => {
            tracing::error!(%error, path = %path.display(), "failed to read {what} fixture");
            T::default()
        }
    }
}

/// Load the MP roster; empty on failure.
#[must_use]
pub fn load_roster(path: &Path) -> Vec<Mp> {
    let roster: Vec<Mp> = read_json(path, "roster");
    tracing::info!(count = roster.len(), "loaded MP roster");
    roster
}

/// Load the email template set; empty lists on failure.
#[must_use]
pub fn load_templates(path: &Path) -> EmailTemplates {
    let templates: EmailTemplates = read_json(path, "template");
    tracing::info!(
        regular = templates.regular.len(),
        prime_minister = templates.prime_minister.len(),
        french = templates.french.len(),
        "loaded email templates"
    );
    templates
}

/// Load the protest list; empty on failure.
#[must_use]
pub fn load_protests(path: &Path) -> Vec<Protest> {
    let list: ProtestList = read_json(path, "protest");
    tracing::info!(count = list.protests.len(), "loaded protest list");
    list.protests
}
