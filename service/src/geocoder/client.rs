//! HTTP client for the postal-code boundary-lookup service.

use async_trait::async_trait;
use thiserror::Error;

use super::types::PostalCodeResponse;

/// Errors that can occur when calling the boundary-lookup service.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service returned a non-success status
    #[error("lookup failed: {status} - {message}")]
    ApiError { status: u16, message: String },
}

/// Trait for postal-code lookups.
///
/// Use [`HttpGeocoderClient`] for real HTTP calls, or [`mock::MockGeocoderClient`]
/// in tests.
#[async_trait]
pub trait GeocoderClient: Send + Sync {
    /// Look up the electoral boundaries containing a normalized postal code.
    async fn lookup_postal_code(&self, code: &str)
        -> Result<PostalCodeResponse, GeocoderError>;
}

/// HTTP-based implementation of [`GeocoderClient`].
pub struct HttpGeocoderClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeocoderClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client with a custom `reqwest::Client` (for timeouts or tests).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeocoderClient for HttpGeocoderClient {
    async fn lookup_postal_code(
        &self,
        code: &str,
    ) -> Result<PostalCodeResponse, GeocoderError> {
        let url = format!("{}/postcodes/{}/", self.base_url, code);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocoderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: PostalCodeResponse = response.json().await?;
        Ok(body)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{GeocoderClient, GeocoderError, PostalCodeResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock implementation of [`GeocoderClient`] for unit tests.
    ///
    /// Configure the next response with [`set_lookup_result`](Self::set_lookup_result)
    /// and inspect received codes with [`lookup_calls`](Self::lookup_calls).
    pub struct MockGeocoderClient {
        lookup_result: Mutex<Option<Result<PostalCodeResponse, GeocoderError>>>,
        lookup_calls: Mutex<Vec<String>>,
    }

    impl MockGeocoderClient {
        pub fn new() -> Self {
            Self {
                lookup_result: Mutex::new(None),
                lookup_calls: Mutex::new(Vec::new()),
            }
        }

        /// Set the result for the next `lookup_postal_code` call.
        pub fn set_lookup_result(&self, result: Result<PostalCodeResponse, GeocoderError>) {
            *self.lookup_result.lock().unwrap() = Some(result);
        }

        /// Get all codes passed to `lookup_postal_code`.
        pub fn lookup_calls(&self) -> Vec<String> {
            self.lookup_calls.lock().unwrap().clone()
        }
    }

    impl Default for MockGeocoderClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl GeocoderClient for MockGeocoderClient {
        async fn lookup_postal_code(
            &self,
            code: &str,
        ) -> Result<PostalCodeResponse, GeocoderError> {
            self.lookup_calls.lock().unwrap().push(code.to_string());

            self.lookup_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(PostalCodeResponse::default()))
        }
    }
}
