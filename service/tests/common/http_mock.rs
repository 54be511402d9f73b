//! HTTP mock server helpers for testing outbound HTTP calls.
//!
//! This module re-exports `wiremock` for declarative HTTP stubbing. Use it
//! to mock the boundary-lookup service and the published tracking sheet in
//! integration tests.
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::common::http_mock::{method, path, Mock, ResponseTemplate, WiremockServer};
//!
//! #[tokio::test]
//! async fn test_external_api_call() {
//!     let server = WiremockServer::start().await;
//!
//!     Mock::given(method("GET"))
//!         .and(path("/postcodes/K1A0A6/"))
//!         .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
//!         .mount(&server)
//!         .await;
//!
//!     // Your code calls server.uri() + "/postcodes/K1A0A6/"
//! }
//! ```
//!
//! # Patterns
//!
//! - **Success response**: `.set_body_json(value)` or `.set_body_string(text)`
//! - **Error response**: `ResponseTemplate::new(500)`
//! - **Timeout simulation**: `.set_delay(Duration::from_secs(30))`
//! - **Request verification**: `.expect(1)` to assert call count

pub use wiremock::matchers::{body_string_contains, method, path};
pub use wiremock::MockServer as WiremockServer;
pub use wiremock::{Mock, ResponseTemplate};
