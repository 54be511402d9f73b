//! Public "emails sent" counter.
//!
//! The campaign publishes its tracking sheet as CSV. A background task polls
//! it on a fixed interval, counts the rows whose event-type column says
//! "Send email", and publishes the result through a watch channel. Any fetch
//! or parse failure degrades the published value to [`EmailCount::Unavailable`]
//! rather than failing the page.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Sheet label counted as one sent email.
const SEND_EMAIL_LABEL: &str = "Send email";

/// Current counter value as published to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailCount {
    /// Sheet unreachable or unparseable; the UI shows "unavailable".
    Unavailable,
    Known(u64),
}

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("sheet fetch failed with status {0}")]
    BadStatus(u16),
}

/// Count data rows whose second column equals "Send email".
///
/// The first line is a header and is skipped. Fields are comma-separated
/// with optional double-quoting (the sheet's timestamp column contains
/// commas, so a naive split would misalign the event column).
#[must_use]
pub fn count_send_email_rows(sheet: &str) -> u64 {
    sheet
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            split_csv_line(line)
                .get(1)
                .is_some_and(|field| field == SEND_EMAIL_LABEL)
        })
        .count() as u64
}

/// Minimal CSV field split: commas separate fields, double quotes group a
/// field, `""` inside quotes is an escaped quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Fetch the published sheet and count sent emails.
///
/// # Errors
///
/// Fails on transport errors or a non-success status.
pub async fn fetch_count(client: &reqwest::Client, url: &str) -> Result<u64, CounterError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CounterError::BadStatus(status.as_u16()));
    }
    let body = response.text().await?;
    Ok(count_send_email_rows(&body))
}

/// Spawn the polling task. The returned handle is aborted on shutdown by
/// dropping the runtime; each tick publishes to `tx`.
pub fn spawn_poller(
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
    tx: watch::Sender<EmailCount>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            let value = match fetch_count(&client, &url).await {
                Ok(count) => EmailCount::Known(count),
                Err(error) => {
                    tracing::warn!(%error, "email counter refresh failed");
                    EmailCount::Unavailable
                }
            };
            if tx.send(value).is_err() {
                // All receivers gone; the app is shutting down.
                return;
            }
        }
    })
}
