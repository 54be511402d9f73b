//! REST API handlers and `OpenAPI` documentation.
//!
//! Every campaign frontend interaction maps onto one endpoint here: MP
//! search, email composition, the protests drawer, the public emails-sent
//! counter, and client-side tracking beacons.

// The OpenApi derive macro generates code that triggers this lint
#![allow(clippy::needless_for_each)]

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::build_info::BuildInfo;
use crate::composer::{compose, ComposeError, ComposedEmail, Language};
use crate::counter::EmailCount;
use crate::protests::{Protest, ProtestList};
use crate::resolver::{Resolution, ResolveError};
use crate::roster::{Mp, ResolvedMp};
use crate::state::AppState;
use crate::tracking::{TrackingEvent, TrackingRecord, TrackingSink};

/// Serialize a `StatusCode` as its `u16` representation.
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires `&T` signature
fn serialize_status_code<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

/// RFC 7807 Problem Details error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI reference identifying the problem type
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short human-readable summary
    pub title: String,
    /// HTTP status code
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ProblemExtensions>,
}

/// Extended error information.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemExtensions {
    /// Stable machine-readable error code
    pub code: String,
    /// Field that caused the error (for validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ProblemDetails {
    fn new(status: StatusCode, slug: &str, title: &str, detail: &str, code: &str) -> Self {
        Self {
            problem_type: format!("https://findmymp.ca/errors/{slug}"),
            title: title.to_string(),
            status,
            detail: detail.to_string(),
            extensions: Some(ProblemExtensions {
                code: code.to_string(),
                field: None,
            }),
        }
    }

    /// Create a validation error response for a specific field.
    #[must_use]
    pub fn validation(detail: &str, field: &str) -> Self {
        let mut problem = Self::new(
            StatusCode::BAD_REQUEST,
            "validation",
            "Validation Error",
            detail,
            "VALIDATION_ERROR",
        );
        if let Some(extensions) = problem.extensions.as_mut() {
            extensions.field = Some(field.to_string());
        }
        problem
    }

    /// Create an internal server error response.
    #[must_use]
    pub fn internal_error(detail: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal Server Error",
            detail,
            "INTERNAL_ERROR",
        )
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ResolveError> for ProblemDetails {
    fn from(error: ResolveError) -> Self {
        let detail = error.to_string();
        match error {
            ResolveError::QueryTooShort => Self::validation(&detail, "q"),
            ResolveError::LookupFailed(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                "lookup-failed",
                "Lookup Failed",
                &detail,
                "LOOKUP_FAILED",
            ),
            ResolveError::NoFederalDistrict(_) => Self::new(
                StatusCode::NOT_FOUND,
                "no-federal-district",
                "No Federal District",
                &detail,
                "NO_FEDERAL_DISTRICT",
            ),
            ResolveError::NotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "not-found",
                "No MP Found",
                &detail,
                "NOT_FOUND",
            ),
            ResolveError::NoMatchForDistrict(_) => Self::new(
                StatusCode::NOT_FOUND,
                "no-default-contact",
                "No Representative Available",
                &detail,
                "NO_DEFAULT_CONTACT",
            ),
        }
    }
}

impl From<ComposeError> for ProblemDetails {
    fn from(error: ComposeError) -> Self {
        Self::internal_error(&error.to_string())
    }
}

/// Fire a tracking beacon without blocking the response.
fn spawn_track(tracker: Arc<dyn TrackingSink>, record: TrackingRecord) {
    tokio::spawn(async move {
        tracker.send(record).await;
    });
}

/// Search query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Postal code, MP name, riding, city, or province
    pub q: String,
}

/// Successful search outcome: either one MP or a capped suggestion list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SearchResponse {
    Match { mp: ResolvedMp },
    Suggestions { suggestions: Vec<Mp> },
}

/// Search for an MP
///
/// Postal-code-shaped queries go through the boundary-lookup service;
/// anything else is matched locally against name, riding, city, and
/// province.
///
/// # Errors
///
/// Returns `ProblemDetails` for validation failures, lookup failures, and
/// queries with no match.
#[utoipa::path(
    get,
    path = "/mps/search",
    tag = "MPs",
    params(SearchParams),
    responses(
        (status = 200, description = "One MP or a suggestion list", body = SearchResponse),
        (status = 400, description = "Query too short", body = ProblemDetails),
        (status = 404, description = "No match", body = ProblemDetails),
        (status = 502, description = "Boundary lookup failed", body = ProblemDetails)
    )
)]
pub async fn search_mps(
    Extension(state): Extension<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ProblemDetails> {
    let resolution = state.resolver.resolve(&params.q).await?;

    match resolution {
        Resolution::Match(mp) => {
            spawn_track(
                state.tracker.clone(),
                TrackingRecord::with_mp(
                    TrackingEvent::SearchMp,
                    &mp.mp.full_name,
                    &mp.mp.constituency,
                ),
            );
            Ok(Json(SearchResponse::Match { mp }))
        }
        Resolution::Suggestions(suggestions) => {
            Ok(Json(SearchResponse::Suggestions { suggestions }))
        }
    }
}

/// Compose request body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    /// The MP as returned by the search endpoint
    pub mp: ResolvedMp,
    #[serde(default = "default_language")]
    pub language: Language,
}

const fn default_language() -> Language {
    Language::English
}

/// Compose a campaign email
///
/// Picks a template (random over the applicable list), substitutes the MP's
/// details and the campaign day count, and returns the subject, body, and
/// `mailto:` URI.
///
/// # Errors
///
/// Returns `ProblemDetails` when no templates are loaded.
#[utoipa::path(
    post,
    path = "/compose",
    tag = "Email",
    request_body = ComposeRequest,
    responses(
        (status = 200, description = "Composed email", body = ComposedEmail),
        (status = 500, description = "Templates unavailable", body = ProblemDetails)
    )
)]
pub async fn compose_email(
    Extension(state): Extension<AppState>,
    Json(request): Json<ComposeRequest>,
) -> Result<Json<ComposedEmail>, ProblemDetails> {
    let email = compose(
        &request.mp,
        request.language,
        &state.templates,
        &state.campaign.default_contact,
        state.campaign.start_date,
        Local::now().date_naive(),
        &mut rand::thread_rng(),
    )?;

    let event = match request.language {
        Language::French => TrackingEvent::SendEmailFrench,
        Language::English => TrackingEvent::SendEmail,
    };
    spawn_track(
        state.tracker.clone(),
        TrackingRecord::with_mp(event, &request.mp.mp.full_name, &request.mp.mp.constituency),
    );

    Ok(Json(email))
}

/// List upcoming protests
#[utoipa::path(
    get,
    path = "/protests",
    tag = "Protests",
    responses(
        (status = 200, description = "Upcoming protests", body = ProtestList)
    )
)]
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn list_protests(Extension(state): Extension<AppState>) -> Json<ProtestList> {
    Json(ProtestList {
        protests: state.protests.as_ref().clone(),
    })
}

/// Emails-sent counter response. `count` is null while the sheet is
/// unreachable or the poller is disabled.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmailCountResponse {
    pub count: Option<u64>,
}

/// Get the public emails-sent counter
#[utoipa::path(
    get,
    path = "/stats/emails-sent",
    tag = "Stats",
    responses(
        (status = 200, description = "Current counter value", body = EmailCountResponse)
    )
)]
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn emails_sent(Extension(state): Extension<AppState>) -> Json<EmailCountResponse> {
    let count = match *state.email_count.borrow() {
        EmailCount::Known(count) => Some(count),
        EmailCount::Unavailable => None,
    };
    Json(EmailCountResponse { count })
}

/// Tracking beacon from the frontend.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub event: TrackingEvent,
    #[serde(default)]
    pub mp_name: Option<String>,
    #[serde(default)]
    pub constituency: Option<String>,
}

/// Record a client-side tracking event
///
/// Always responds 202: delivery is best-effort and failures are never
/// surfaced.
#[utoipa::path(
    post,
    path = "/track",
    tag = "Tracking",
    request_body = TrackRequest,
    responses(
        (status = 202, description = "Beacon accepted")
    )
)]
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn track_event(
    Extension(state): Extension<AppState>,
    Json(request): Json<TrackRequest>,
) -> StatusCode {
    spawn_track(
        state.tracker.clone(),
        TrackingRecord {
            event: request.event,
            mp_name: request.mp_name,
            constituency: request.constituency,
        },
    );
    StatusCode::ACCEPTED
}

/// Get build information
///
/// Returns metadata about the running service including version, git SHA, and build time.
#[utoipa::path(
    get,
    path = "/build-info",
    tag = "System",
    responses(
        (status = 200, description = "Build information retrieved successfully", body = BuildInfo)
    )
)]
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn get_build_info(Extension(state): Extension<AppState>) -> Json<BuildInfo> {
    Json(state.build_info.clone())
}

/// `OpenAPI` documentation for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FindMyMP API",
        version = "1.0.0",
        description = "REST API backing the contact-your-MP campaign page",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "REST API v1")
    ),
    paths(
        search_mps,
        compose_email,
        list_protests,
        emails_sent,
        track_event,
        get_build_info
    ),
    components(schemas(
        Mp,
        ResolvedMp,
        Language,
        ComposedEmail,
        ComposeRequest,
        Protest,
        ProtestList,
        EmailCountResponse,
        TrackingEvent,
        TrackRequest,
        SearchResponse,
        BuildInfo,
        ProblemDetails,
        ProblemExtensions
    ))
)]
pub struct ApiDoc;
