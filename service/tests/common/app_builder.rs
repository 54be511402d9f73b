//! Test app builder that mirrors main.rs wiring with injectable deps/mocks.
//!
//! This module provides a [`TestAppBuilder`] that constructs an Axum router matching
//! the production configuration in `main.rs`, but with the ability to inject mocks
//! and test-specific configurations.
//!
//! # Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_full_app() {
//!     let app = TestAppBuilder::with_mocks()
//!         .with_cors(&["http://localhost:5173"])
//!         .build();
//!
//!     // Use app.oneshot(...) to send requests
//! }
//! ```
//!
//! # Preset Builders
//!
//! - [`TestAppBuilder::minimal()`] - Health check only
//! - [`TestAppBuilder::with_mocks()`] - Full API with sample fixtures and mocks

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{
        header::{
            HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY,
            STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
        Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use findmymp_api::{
    build_info::BuildInfoProvider,
    composer::{EmailTemplates, Template},
    config::{CampaignConfig, SecurityHeadersConfig},
    counter::EmailCount,
    geocoder::{mock::MockGeocoderClient, GeocoderClient},
    protests::Protest,
    resolver::Resolver,
    rest::{self, ApiDoc},
    roster::Mp,
    state::AppState,
    tracking::{NoopTracker, TrackingSink},
};
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Health check handler (mirrors main.rs)
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Build security headers from configuration (mirrors main.rs)
fn build_security_headers(config: &SecurityHeadersConfig) -> Arc<Vec<(HeaderName, HeaderValue)>> {
    let mut headers = Vec::new();

    // X-Content-Type-Options: nosniff (always)
    headers.push((X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")));

    // X-Frame-Options
    if let Ok(value) = HeaderValue::from_str(&config.frame_options) {
        headers.push((X_FRAME_OPTIONS, value));
    }

    // X-XSS-Protection (legacy but still useful for older browsers)
    headers.push((X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")));

    // Content-Security-Policy
    if let Ok(value) = HeaderValue::from_str(&config.content_security_policy) {
        headers.push((CONTENT_SECURITY_POLICY, value));
    }

    // Referrer-Policy
    if let Ok(value) = HeaderValue::from_str(&config.referrer_policy) {
        headers.push((REFERRER_POLICY, value));
    }

    // HSTS (only if enabled - should only be used with HTTPS)
    if config.hsts_enabled {
        let hsts_value = if config.hsts_include_subdomains {
            format!("max-age={}; includeSubDomains", config.hsts_max_age)
        } else {
            format!("max-age={}", config.hsts_max_age)
        };
        if let Ok(value) = HeaderValue::from_str(&hsts_value) {
            headers.push((STRICT_TRANSPORT_SECURITY, value));
        }
    }

    Arc::new(headers)
}

/// Middleware to add security headers to all responses (mirrors main.rs)
async fn security_headers_middleware(
    Extension(headers): Extension<Arc<Vec<(HeaderName, HeaderValue)>>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let response_headers = response.headers_mut();
    for (name, value) in headers.iter() {
        response_headers.insert(name.clone(), value.clone());
    }
    response
}

/// A small roster with a couple of distinctive names, an em-dash riding,
/// a Quebec MP, and the Prime Minister (the default contact).
pub fn sample_roster() -> Vec<Mp> {
    fn mp(first: &str, last: &str, constituency: &str, province: &str, party: &str) -> Mp {
        Mp {
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: format!("{first} {last}"),
            constituency: constituency.to_string(),
            province: province.to_string(),
            party: party.to_string(),
            email: format!(
                "{}.{}@parl.gc.ca",
                first.to_lowercase(),
                last.to_lowercase()
            ),
        }
    }

    vec![
        mp("Mark", "Carney", "Nepean", "Ontario", "Liberal"),
        mp("Yasir", "Naqvi", "Ottawa Centre", "Ontario", "Liberal"),
        mp(
            "Mona",
            "Fortier",
            "Ottawa\u{2014}Vanier\u{2014}Gloucester",
            "Ontario",
            "Liberal",
        ),
        mp(
            "Steven",
            "Guilbeault",
            "Laurier\u{2014}Sainte-Marie",
            "Quebec",
            "Liberal",
        ),
        mp(
            "Elizabeth",
            "May",
            "Saanich\u{2014}Gulf Islands",
            "British Columbia",
            "Green",
        ),
    ]
}

/// Templates covering all three lists, every placeholder token included.
pub fn sample_templates() -> EmailTemplates {
    EmailTemplates {
        regular: vec![Template {
            body: "Dear [MP_NAME] of [CONSTITUENCY_INFO], it has been [DAYS_COUNT] days.".into(),
        }],
        prime_minister: vec![Template {
            body: "Prime Minister [MP_NAME], [DAYS_COUNT] days. [CONSTITUENCY_INFO] is watching."
                .into(),
        }],
        french: vec![Template {
            body: "Cher [MP_NAME] ([CONSTITUENCY_INFO]), cela fait [DAYS_COUNT] jours.".into(),
        }],
    }
}

pub fn sample_protests() -> Vec<Protest> {
    vec![
        Protest {
            id: 1,
            title: "Rally on the Hill".into(),
            date: "2025-04-05".into(),
            time: "13:00".into(),
            location: "Parliament Hill, Ottawa".into(),
            organizer: Some("Community Coalition".into()),
            description: None,
            image: Some("images/protests/rally.jpg".into()),
        },
        Protest {
            id: 2,
            title: "Vancouver Art Build".into(),
            date: "2025-04-19".into(),
            time: "11:00".into(),
            location: "Grandview Park, Vancouver".into(),
            organizer: None,
            description: Some("Banner painting. Supplies provided.".into()),
            image: None,
        },
    ]
}

/// Builder for test applications that mirrors main.rs wiring.
///
/// Use the builder pattern to construct an Axum router with the exact same
/// layer ordering and configuration as production, while allowing injection
/// of mocks for testing.
pub struct TestAppBuilder {
    /// Whether to include the REST API routes (/api/v1/*)
    include_api: bool,
    /// Whether to include the health check route
    include_health: bool,
    /// Whether to include Swagger UI
    include_swagger: bool,
    /// Roster the resolver is built over
    roster: Vec<Mp>,
    /// Email template lists
    templates: EmailTemplates,
    /// Protest fixture entries
    protests: Vec<Protest>,
    /// Geocoder client (None uses a fresh MockGeocoderClient)
    geocoder: Option<Arc<dyn GeocoderClient>>,
    /// Tracking sink (None uses NoopTracker)
    tracker: Option<Arc<dyn TrackingSink>>,
    /// Counter receiver (None starts a fresh channel at Unavailable)
    email_count: Option<watch::Receiver<EmailCount>>,
    /// Campaign constants (start date, default contact)
    campaign: CampaignConfig,
    /// CORS allowed origins (None means no CORS layer)
    cors_origins: Option<Vec<String>>,
    /// Security headers config (None means disabled)
    security_headers: Option<SecurityHeadersConfig>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_api: false,
            include_health: false,
            include_swagger: false,
            roster: Vec::new(),
            templates: EmailTemplates::default(),
            protests: Vec::new(),
            geocoder: None,
            tracker: None,
            email_count: None,
            campaign: CampaignConfig::default(),
            cors_origins: None,
            security_headers: None,
        }
    }

    // =========================================================================
    // Preset Builders
    // =========================================================================

    /// Create a minimal app with only the health check endpoint.
    ///
    /// Use this for simple connectivity tests.
    #[must_use]
    pub fn minimal() -> Self {
        Self::new().with_health()
    }

    /// Create a full app over the sample fixtures with mock side effects.
    ///
    /// Mirrors production main.rs wiring but with a mock geocoder and no
    /// real tracking or counter polling.
    #[must_use]
    pub fn with_mocks() -> Self {
        Self::new()
            .with_api()
            .with_health()
            .with_roster(sample_roster())
            .with_templates(sample_templates())
            .with_protests(sample_protests())
    }

    // =========================================================================
    // Component Configuration
    // =========================================================================

    /// Include the REST API routes (/api/v1/*).
    #[must_use]
    pub fn with_api(mut self) -> Self {
        self.include_api = true;
        self
    }

    /// Include the health check route (/health).
    #[must_use]
    pub fn with_health(mut self) -> Self {
        self.include_health = true;
        self
    }

    /// Include Swagger UI (/swagger-ui).
    #[must_use]
    pub fn with_swagger(mut self) -> Self {
        self.include_swagger = true;
        self
    }

    #[must_use]
    pub fn with_roster(mut self, roster: Vec<Mp>) -> Self {
        self.roster = roster;
        self
    }

    #[must_use]
    pub fn with_templates(mut self, templates: EmailTemplates) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub fn with_protests(mut self, protests: Vec<Protest>) -> Self {
        self.protests = protests;
        self
    }

    /// Inject a geocoder client (usually a shared `MockGeocoderClient`).
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn GeocoderClient>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Inject a tracking sink (usually a shared `RecordingTracker`).
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<dyn TrackingSink>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Inject a counter receiver so tests can publish values themselves.
    #[must_use]
    pub fn with_email_count(mut self, receiver: watch::Receiver<EmailCount>) -> Self {
        self.email_count = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_campaign(mut self, campaign: CampaignConfig) -> Self {
        self.campaign = campaign;
        self
    }

    /// Configure CORS with specific allowed origins.
    ///
    /// Pass an empty slice to block all cross-origin requests.
    /// Pass `&["*"]` to allow any origin.
    #[must_use]
    pub fn with_cors(mut self, origins: &[&str]) -> Self {
        self.cors_origins = Some(origins.iter().map(|s| (*s).to_string()).collect());
        self
    }

    /// Enable security headers with default configuration.
    #[must_use]
    pub fn with_security_headers_default(mut self) -> Self {
        self.security_headers = Some(SecurityHeadersConfig::default());
        self
    }

    /// Enable security headers with custom configuration.
    #[must_use]
    pub fn with_security_headers(mut self, config: SecurityHeadersConfig) -> Self {
        self.security_headers = Some(config);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build the Axum router.
    ///
    /// The layer ordering matches main.rs exactly:
    /// 1. Routes (API v1, Health, Swagger)
    /// 2. Extension (AppState)
    /// 3. CORS layer
    /// 4. Security headers middleware (outermost)
    #[must_use]
    pub fn build(self) -> Router {
        let geocoder = self
            .geocoder
            .unwrap_or_else(|| Arc::new(MockGeocoderClient::new()));
        let tracker: Arc<dyn TrackingSink> =
            self.tracker.unwrap_or_else(|| Arc::new(NoopTracker));
        // The receiver keeps serving the last value after the sender drops.
        let email_count = self
            .email_count
            .unwrap_or_else(|| watch::channel(EmailCount::Unavailable).1);

        let resolver = Arc::new(Resolver::new(
            self.roster,
            geocoder,
            self.campaign.default_contact.clone(),
        ));

        let state = AppState {
            resolver,
            templates: Arc::new(self.templates),
            protests: Arc::new(self.protests),
            tracker,
            campaign: self.campaign,
            email_count,
            build_info: BuildInfoProvider::from_env().build_info(),
        };

        let mut app = Router::new();

        if self.include_api {
            let api_v1 = Router::new()
                .route("/mps/search", get(rest::search_mps))
                .route("/compose", post(rest::compose_email))
                .route("/protests", get(rest::list_protests))
                .route("/stats/emails-sent", get(rest::emails_sent))
                .route("/track", post(rest::track_event))
                .route("/build-info", get(rest::get_build_info));
            app = app.nest("/api/v1", api_v1);
        }

        if self.include_swagger {
            app = app.merge(
                SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        if self.include_health {
            app = app.route("/health", get(health_check));
        }

        app = app.layer(Extension(state));

        // Add CORS layer if configured
        if let Some(origins) = self.cors_origins {
            let allow_origin: AllowOrigin = if origins.iter().any(|o| o == "*") {
                AllowOrigin::any()
            } else if origins.is_empty() {
                AllowOrigin::list(Vec::<HeaderValue>::new())
            } else {
                let header_values: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect();
                AllowOrigin::list(header_values)
            };

            app = app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers(Any)
                    .allow_origin(allow_origin),
            );
        }

        // Add security headers middleware if configured
        if let Some(config) = self.security_headers {
            if config.enabled {
                let headers = build_security_headers(&config);
                app = app
                    .layer(middleware::from_fn(security_headers_middleware))
                    .layer(Extension(headers));
            }
        }

        app
    }
}
