//! MP resolution: free-text queries and postal-code lookups.
//!
//! Implements the two-path search contract: input shaped like a Canadian
//! postal code goes through the boundary-lookup service and is matched onto
//! the roster by riding name (exact, then em-dash prefix, then the default
//! contact); anything else is a local substring search over the roster.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::geocoder::{GeocoderClient, GeocoderError};
use crate::roster::{search, Mp, ResolvedMp};

/// Suggestion lists are truncated to this many entries.
pub const MAX_SUGGESTIONS: usize = 10;

/// Riding names join their parts with an em-dash (e.g., "Ottawa\u{2014}Vanier").
const RIDING_SEPARATOR: char = '\u{2014}';

#[allow(clippy::expect_used)] // pattern is a literal, checked by tests
static POSTAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z]\d[A-Z]\s?\d[A-Z]\d$").expect("postal code pattern")
});

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one MP.
    Match(ResolvedMp),
    /// Several candidates, capped at [`MAX_SUGGESTIONS`], in roster order.
    Suggestions(Vec<Mp>),
}

/// Errors surfaced to the user by the resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Query empty or shorter than two characters; nothing was queried.
    #[error("please enter at least 2 characters")]
    QueryTooShort,

    /// The boundary-lookup call failed.
    #[error("postal code lookup failed")]
    LookupFailed(#[from] GeocoderError),

    /// The lookup succeeded but returned no federal electoral district.
    #[error("no federal electoral district found for postal code {0}")]
    NoFederalDistrict(String),

    /// Free-text search produced zero hits.
    #[error("no MP found matching \"{0}\" - try a postal code, name, or riding")]
    NotFound(String),

    /// District resolved but neither a roster entry nor the default contact
    /// could be matched.
    #[error("no representative available for {0}")]
    NoMatchForDistrict(String),
}

/// True when the input is shaped like a Canadian postal code
/// (`A1A 1A1`, case-insensitive, optional internal space).
#[must_use]
pub fn is_postal_code(input: &str) -> bool {
    POSTAL_CODE_RE.is_match(input)
}

/// Uppercase and strip whitespace (`"k1a 0a6"` -> `"K1A0A6"`).
#[must_use]
pub fn normalize_postal_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Resolves user queries against the roster and the geocoding service.
pub struct Resolver {
    roster: Vec<Mp>,
    geocoder: Arc<dyn GeocoderClient>,
    default_contact: String,
}

impl Resolver {
    /// Create a resolver over a loaded roster.
    ///
    /// `default_contact` is the full name of the at-large fallback (the
    /// Prime Minister) substituted when a riding has no roster entry.
    pub fn new(
        roster: Vec<Mp>,
        geocoder: Arc<dyn GeocoderClient>,
        default_contact: impl Into<String>,
    ) -> Self {
        Self {
            roster,
            geocoder,
            default_contact: default_contact.into(),
        }
    }

    #[must_use]
    pub fn roster(&self) -> &[Mp] {
        &self.roster
    }

    /// Resolve a free-text query or postal code to an MP.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`] for the full taxonomy. Validation failures are
    /// reported before any network call is made.
    pub async fn resolve(&self, query: &str) -> Result<Resolution, ResolveError> {
        let query = query.trim();
        if query.chars().count() < 2 {
            return Err(ResolveError::QueryTooShort);
        }

        if is_postal_code(query) {
            let code = normalize_postal_code(query);
            self.resolve_postal_code(&code).await
        } else {
            self.resolve_text(query)
        }
    }

    async fn resolve_postal_code(&self, code: &str) -> Result<Resolution, ResolveError> {
        let response = self.geocoder.lookup_postal_code(code).await?;

        let district = response
            .federal_district()
            .ok_or_else(|| ResolveError::NoFederalDistrict(code.to_string()))?;

        let district_lower = district.to_lowercase();

        // Exact riding-name match wins outright.
        if let Some(mp) = self
            .roster
            .iter()
            .find(|mp| mp.constituency.to_lowercase() == district_lower)
        {
            return Ok(Resolution::Match(ResolvedMp::direct(mp.clone())));
        }

        // Riding names drift across redistributions; retry with the part of
        // the district name before the em-dash as a prefix of the roster name.
        let prefix = district_lower
            .split(RIDING_SEPARATOR)
            .next()
            .unwrap_or(&district_lower)
            .trim()
            .to_string();
        if let Some(mp) = self
            .roster
            .iter()
            .find(|mp| mp.constituency.to_lowercase().starts_with(&prefix))
        {
            return Ok(Resolution::Match(ResolvedMp::direct(mp.clone())));
        }

        // Vacant seat: substitute the default contact, keeping what was
        // actually looked up so the email can say so.
        let default_lower = self.default_contact.to_lowercase();
        self.roster
            .iter()
            .find(|mp| mp.full_name.to_lowercase() == default_lower)
            .map(|mp| {
                Resolution::Match(ResolvedMp::fallback(
                    mp.clone(),
                    district.to_string(),
                    code.to_string(),
                ))
            })
            .ok_or_else(|| ResolveError::NoMatchForDistrict(district.to_string()))
    }

    fn resolve_text(&self, query: &str) -> Result<Resolution, ResolveError> {
        let hits = search(&self.roster, query);
        match hits.len() {
            0 => Err(ResolveError::NotFound(query.to_string())),
            1 => Ok(Resolution::Match(ResolvedMp::direct(hits[0].clone()))),
            _ => Ok(Resolution::Suggestions(
                hits.into_iter().take(MAX_SUGGESTIONS).cloned().collect(),
            )),
        }
    }
}
