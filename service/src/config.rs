use chrono::NaiveDate;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with FMP_ prefix (always wins)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
    #[serde(default)]
    pub swagger: SwaggerConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub campaign: CampaignConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP server bind address.
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests.
    /// Use `"*"` to allow any origin (not recommended for production).
    /// Accepts either an array or comma-separated string.
    /// Example: `["http://localhost:5173"]` or `"http://localhost:5173,https://app.example.com"`
    #[serde(
        default = "default_allowed_origins",
        deserialize_with = "deserialize_origins"
    )]
    pub allowed_origins: Vec<String>,
}

/// Deserialize origins from comma-separated string or array, filtering empty values.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let origins: Vec<String> = deserialize_vec_from_string_or_vec(deserializer)?;
    Ok(origins.into_iter().filter(|s| !s.is_empty()).collect())
}

/// External boundary-lookup (geocoding) service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocoderConfig {
    /// Base URL of the boundary-lookup API.
    #[serde(default = "default_geocoder_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
}

/// Usage tracking beacons.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// When false, beacons are dropped locally.
    #[serde(default)]
    pub enabled: bool,

    /// Form endpoint receiving tracking submissions.
    #[serde(default)]
    pub endpoint: String,
}

/// Emails-sent counter polling.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CounterConfig {
    /// When false, the counter stays "unavailable" and no poller runs.
    #[serde(default)]
    pub enabled: bool,

    /// Published CSV sheet with tracking rows.
    #[serde(default)]
    pub sheet_url: String,

    /// Poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

/// Fixture file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_mps_path")]
    pub mps_path: String,

    #[serde(default = "default_templates_path")]
    pub templates_path: String,

    #[serde(default = "default_protests_path")]
    pub protests_path: String,
}

/// Campaign constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CampaignConfig {
    /// Date the campaign started; fills the `[DAYS_COUNT]` template token.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Full name of the at-large fallback contact (the Prime Minister).
    /// Must match a roster entry for the vacant-seat substitution to work.
    #[serde(default = "default_contact")]
    pub default_contact: String,
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_allowed_origins() -> Vec<String> {
    // Default to empty (no cross-origin requests allowed) - safe for production
    // Configure explicitly via FMP_CORS__ALLOWED_ORIGINS or config.yaml
    vec![]
}

fn default_geocoder_base_url() -> String {
    "https://represent.opennorth.ca".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_geocoder_timeout() -> u64 {
    10
}

#[allow(clippy::missing_const_for_fn)]
fn default_poll_interval() -> u64 {
    60
}

fn default_mps_path() -> String {
    "data/mps.json".to_string()
}

fn default_templates_path() -> String {
    "data/templates.json".to_string()
}

fn default_protests_path() -> String {
    "data/protests.json".to_string()
}

#[allow(clippy::expect_used)] // literal date
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid campaign start date")
}

fn default_contact() -> String {
    "Mark Carney".to_string()
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_base_url(),
            timeout_secs: default_geocoder_timeout(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sheet_url: String::new(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            mps_path: default_mps_path(),
            templates_path: default_templates_path(),
            protests_path: default_protests_path(),
        }
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            default_contact: default_contact(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityHeadersConfig {
    /// Enable security headers (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Enable HSTS header (default: false, enable in production with HTTPS).
    #[serde(default)]
    pub hsts_enabled: bool,

    /// HSTS max-age in seconds (default: 31536000 = 1 year).
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age: u64,

    /// Include subdomains in HSTS (default: true).
    #[serde(default = "default_true")]
    pub hsts_include_subdomains: bool,

    /// X-Frame-Options value: "DENY" or "SAMEORIGIN" (default: "DENY").
    #[serde(default = "default_frame_options")]
    pub frame_options: String,

    /// Content-Security-Policy header value (default: "default-src 'self'").
    #[serde(default = "default_csp")]
    pub content_security_policy: String,

    /// Referrer-Policy header value (default: "strict-origin-when-cross-origin").
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_hsts_max_age() -> u64 {
    31_536_000 // 1 year
}

fn default_frame_options() -> String {
    "DENY".to_string()
}

fn default_csp() -> String {
    "default-src 'self'".to_string()
}

fn default_referrer_policy() -> String {
    "strict-origin-when-cross-origin".to_string()
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hsts_enabled: false,
            hsts_max_age: default_hsts_max_age(),
            hsts_include_subdomains: default_true(),
            frame_options: default_frame_options(),
            content_security_policy: default_csp(),
            referrer_policy: default_referrer_policy(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwaggerConfig {
    /// Enable Swagger UI at /swagger-ui.
    /// Default: false (disabled for security - exposes API documentation).
    /// Enable in development via `FMP_SWAGGER__ENABLED=true`
    #[serde(default)]
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: default_port(),
                host: default_host(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
            cors: CorsConfig::default(),
            security_headers: SecurityHeadersConfig::default(),
            swagger: SwaggerConfig::default(),
            geocoder: GeocoderConfig::default(),
            tracking: TrackingConfig::default(),
            counter: CounterConfig::default(),
            data: DataConfig::default(),
            campaign: CampaignConfig::default(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with FMP_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file("config.yaml"))
            .merge(Env::prefixed("FMP_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("FMP_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Port must be non-zero
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port cannot be 0".into()));
        }

        // Geocoder base URL must be an HTTP(S) URL
        if !self.geocoder.base_url.starts_with("http://")
            && !self.geocoder.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "geocoder.base_url must start with http:// or https://, got: '{}'",
                self.geocoder.base_url
            )));
        }

        if self.geocoder.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "geocoder.timeout_secs cannot be 0".into(),
            ));
        }

        // Tracking endpoint is required when tracking is enabled
        if self.tracking.enabled && self.tracking.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "tracking.endpoint is required when tracking.enabled is true. Set FMP_TRACKING__ENDPOINT or configure in config.yaml.".into(),
            ));
        }

        // Counter sheet URL is required when the poller is enabled
        if self.counter.enabled && self.counter.sheet_url.is_empty() {
            return Err(ConfigError::Validation(
                "counter.sheet_url is required when counter.enabled is true. Set FMP_COUNTER__SHEET_URL or configure in config.yaml.".into(),
            ));
        }

        if self.counter.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "counter.poll_interval_secs cannot be 0".into(),
            ));
        }

        // The vacant-seat fallback needs a contact to fall back to
        if self.campaign.default_contact.trim().is_empty() {
            return Err(ConfigError::Validation(
                "campaign.default_contact cannot be empty".into(),
            ));
        }

        // CORS origins must be valid URLs or "*"
        for origin in &self.cors.allowed_origins {
            if origin != "*" && !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "cors.allowed_origins contains invalid origin '{origin}'. Must be '*' or start with http:// or https://"
                )));
            }
        }

        // X-Frame-Options must be DENY or SAMEORIGIN
        let frame_opts = self.security_headers.frame_options.to_uppercase();
        if frame_opts != "DENY" && frame_opts != "SAMEORIGIN" {
            return Err(ConfigError::Validation(format!(
                "security_headers.frame_options must be 'DENY' or 'SAMEORIGIN', got: '{}'",
                self.security_headers.frame_options
            )));
        }

        Ok(())
    }
}
