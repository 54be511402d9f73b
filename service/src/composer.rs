//! Email composition: templates, day count, and `mailto:` synthesis.
//!
//! Takes a resolved MP and a template set and produces the subject, body,
//! and `mailto:` URI handed to the platform mail client. Template selection
//! is random over the applicable list; callers inject the [`Rng`] so tests
//! are deterministic.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::roster::ResolvedMp;

/// Email language variant. Quebec MPs get the French list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    French,
}

/// One email body with placeholder tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    pub body: String,
}

/// Named template lists loaded from the template fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplates {
    #[serde(default)]
    pub regular: Vec<Template>,
    #[serde(default)]
    pub prime_minister: Vec<Template>,
    #[serde(default)]
    pub french: Vec<Template>,
}

/// A fully composed email ready to hand to a mail client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposedEmail {
    pub subject: String,
    pub body: String,
    pub mailto: String,
}

#[derive(Debug, Error)]
pub enum ComposeError {
    /// The applicable template list is empty (fixture failed to load).
    #[error("no email templates available")]
    NoTemplates,
}

const SUBJECT_EN: &str = "A message from your constituent";
const SUBJECT_FR: &str = "Un message de votre \u{e9}lecteur";

const MP_NAME_TOKEN: &str = "[MP_NAME]";
const CONSTITUENCY_TOKEN: &str = "[CONSTITUENCY_INFO]";
const DAYS_TOKEN: &str = "[DAYS_COUNT]";

/// Whole days elapsed between the campaign start date and `today`.
///
/// Both dates are taken at midnight, so the count increments exactly at the
/// day boundary. A clock set before the start date yields a negative value,
/// passed through verbatim.
#[must_use]
pub fn days_since(start: NaiveDate, today: NaiveDate) -> i64 {
    (today - start).num_days()
}

/// Compose an email for `mp`.
///
/// Template choice: the default contact (Prime Minister) always gets the
/// prime-minister list; otherwise French picks from the French list and
/// English from the regular list, uniformly at random via `rng`.
///
/// # Errors
///
/// Returns [`ComposeError::NoTemplates`] when the applicable list is empty.
pub fn compose<R: Rng>(
    mp: &ResolvedMp,
    language: Language,
    templates: &EmailTemplates,
    default_contact: &str,
    start_date: NaiveDate,
    today: NaiveDate,
    rng: &mut R,
) -> Result<ComposedEmail, ComposeError> {
    let list = if mp.mp.full_name.to_lowercase() == default_contact.to_lowercase() {
        &templates.prime_minister
    } else if language == Language::French {
        &templates.french
    } else {
        &templates.regular
    };

    if list.is_empty() {
        return Err(ComposeError::NoTemplates);
    }
    let template = &list[rng.gen_range(0..list.len())];

    let body = render_body(template, mp, language, days_since(start_date, today));

    let subject = match language {
        Language::English => SUBJECT_EN,
        Language::French => SUBJECT_FR,
    };

    let mailto = format!(
        "mailto:{}?subject={}&body={}",
        mp.mp.email,
        urlencoding::encode(subject),
        urlencoding::encode(&body)
    );

    Ok(ComposedEmail {
        subject: subject.to_string(),
        body,
        mailto,
    })
}

/// Substitute placeholder tokens and, for fallback results, append the
/// vacant-seat note. Substitution order: name, constituency info, day count.
fn render_body(template: &Template, mp: &ResolvedMp, language: Language, days: i64) -> String {
    let constituency_info = format!("{}, {}", mp.mp.constituency, mp.mp.province);

    let mut body = template
        .body
        .replace(MP_NAME_TOKEN, &mp.mp.full_name)
        .replace(CONSTITUENCY_TOKEN, &constituency_info)
        .replace(DAYS_TOKEN, &days.to_string());

    if mp.is_default {
        body.push_str(&fallback_note(mp, language));
    }

    body
}

/// Note appended when the default contact stands in for a vacant seat.
fn fallback_note(mp: &ResolvedMp, language: Language) -> String {
    let district = mp.actual_constituency.as_deref().unwrap_or_default();
    match language {
        Language::English => {
            let mut note = format!(
                "\n\nNote: I am writing to the Prime Minister's office because \
                 the seat for {district} currently has no sitting MP."
            );
            if let Some(code) = &mp.postal_code {
                note.push_str(&format!(" My postal code is {code}."));
            }
            note
        }
        Language::French => {
            let mut note = format!(
                "\n\nNote : je m'adresse au bureau du premier ministre, car \
                 la circonscription de {district} n'a pas de d\u{e9}put\u{e9} \
                 en ce moment."
            );
            if let Some(code) = &mp.postal_code {
                note.push_str(&format!(" Mon code postal est {code}."));
            }
            note
        }
    }
}
