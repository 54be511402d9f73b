#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

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
    config::{Config, SecurityHeadersConfig},
    counter::{self, EmailCount},
    fixtures,
    geocoder::HttpGeocoderClient,
    resolver::Resolver,
    rest::{self, ApiDoc},
    state::AppState,
    tracking::{FormTracker, NoopTracker, TrackingSink},
};
use tokio::sync::watch;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Health check handler
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Build security headers from configuration.
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

/// Middleware to add security headers to all responses.
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

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load and validate configuration first (fail-fast)
    let config = Config::load().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up logging from config
    std::env::set_var("RUST_LOG", &config.logging.level);
    tracing_subscriber::fmt::init();

    // Init banner so container logs clearly show startup
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "findmymp-api starting up"
    );

    // Fixture loads are independent; a failed load logs and leaves that
    // dataset empty rather than aborting startup.
    let roster = fixtures::load_roster(Path::new(&config.data.mps_path));
    let templates = fixtures::load_templates(Path::new(&config.data.templates_path));
    let protests = fixtures::load_protests(Path::new(&config.data.protests_path));

    let build_info = BuildInfoProvider::from_env();
    let build_info_snapshot = build_info.build_info();
    tracing::info!(
        version = %build_info_snapshot.version,
        git_sha = %build_info_snapshot.git_sha,
        build_time = %build_info_snapshot.build_time,
        "resolved build metadata"
    );

    // One HTTP client shared by the geocoder, tracker, and counter poller
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.geocoder.timeout_secs))
        .build()?;

    let geocoder = Arc::new(HttpGeocoderClient::with_client(
        http_client.clone(),
        config.geocoder.base_url.clone(),
    ));
    let resolver = Arc::new(Resolver::new(
        roster,
        geocoder,
        config.campaign.default_contact.clone(),
    ));

    let tracker: Arc<dyn TrackingSink> = if config.tracking.enabled {
        tracing::info!(endpoint = %config.tracking.endpoint, "usage tracking enabled");
        Arc::new(FormTracker::new(
            http_client.clone(),
            config.tracking.endpoint.clone(),
        ))
    } else {
        tracing::info!("usage tracking disabled");
        Arc::new(NoopTracker)
    };

    // Counter starts unavailable until the first successful poll
    let (count_tx, count_rx) = watch::channel(EmailCount::Unavailable);
    if config.counter.enabled {
        tracing::info!(
            interval_secs = config.counter.poll_interval_secs,
            "email counter poller enabled"
        );
        counter::spawn_poller(
            http_client,
            config.counter.sheet_url.clone(),
            Duration::from_secs(config.counter.poll_interval_secs),
            count_tx,
        );
    } else {
        tracing::info!("email counter poller disabled");
    }

    let state = AppState {
        resolver,
        templates: Arc::new(templates),
        protests: Arc::new(protests),
        tracker,
        campaign: config.campaign.clone(),
        email_count: count_rx,
        build_info: build_info_snapshot,
    };

    // Build CORS layer from config
    let cors_origins = &config.cors.allowed_origins;
    let allow_origin: AllowOrigin = if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin - not recommended for production");
        AllowOrigin::any()
    } else if cors_origins.is_empty() {
        tracing::info!(
            "CORS allowed origins not configured - cross-origin requests will be blocked"
        );
        AllowOrigin::list(Vec::<HeaderValue>::new())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        tracing::info!(origins = ?cors_origins, "CORS allowed origins configured");
        AllowOrigin::list(origins)
    };

    // Build security headers layer if enabled
    let security_headers = if config.security_headers.enabled {
        tracing::info!("Security headers enabled");
        Some(build_security_headers(&config.security_headers))
    } else {
        tracing::info!("Security headers disabled");
        None
    };

    let api_v1 = Router::new()
        .route("/mps/search", get(rest::search_mps))
        .route("/compose", post(rest::compose_email))
        .route("/protests", get(rest::list_protests))
        .route("/stats/emails-sent", get(rest::emails_sent))
        .route("/track", post(rest::track_event))
        .route("/build-info", get(rest::get_build_info));

    // Build the API
    let mut app = Router::new()
        .nest("/api/v1", api_v1)
        // Health check route
        .route("/health", get(health_check))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(allow_origin),
        );

    if config.swagger.enabled {
        tracing::info!("Swagger UI enabled at /swagger-ui");
        app = app
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    // Add security headers middleware if enabled
    if let Some(headers) = security_headers {
        app = app
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(Extension(headers));
    }

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Starting server at http://{}/api/v1", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
