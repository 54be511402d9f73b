//! Postal-code geocoding client.
//!
//! Thin trait-based HTTP client for the external boundary-lookup service
//! that maps a Canadian postal code onto electoral districts. The trait
//! abstraction enables:
//!
//! - Easy mocking in unit tests
//! - HTTP-level testing with wiremock in integration tests
//! - Swapping providers without touching the resolver
//!
//! # Example
//!
//! ```ignore
//! use findmymp_api::geocoder::{GeocoderClient, HttpGeocoderClient};
//!
//! let client = HttpGeocoderClient::new("https://represent.opennorth.ca");
//! let response = client.lookup_postal_code("K1A0A6").await?;
//! if let Some(district) = response.federal_district() {
//!     println!("federal riding: {district}");
//! }
//! ```

mod client;
mod types;

pub use client::{GeocoderClient, GeocoderError, HttpGeocoderClient};
pub use types::{Boundary, PostalCodeResponse};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;
