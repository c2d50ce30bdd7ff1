//! # Tickcast Core
//!
//! Core contracts and domain types for the tickcast forecasting toolkit.
//!
//! ## Overview
//!
//! - **Canonical domain models** for symbols, intervals, and price series
//! - **Series source trait** for historical-price providers
//! - **Yahoo chart source** behind a blocking HTTP transport seam
//! - **Synthetic source** producing seeded, reproducible random walks
//! - **Fallback source** substituting synthetic data when upstream is empty
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`data_source`] | `SeriesSource` trait and `SourceError` |
//! | [`domain`] | Domain models (`Symbol`, `Interval`, `TimeSeries`, ...) |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP client abstraction with timeouts |
//! | [`sources`] | Yahoo, synthetic and fallback sources |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickcast_core::{FallbackSource, SeriesSource, SyntheticSource, YahooSource};
//!
//! let source = FallbackSource::new(YahooSource::default(), SyntheticSource::default());
//! let series = source.fetch_or_empty(&request);
//! println!("{} points (synthetic: {})", series.len(), series.is_synthetic());
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use tickcast_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::Unavailable => {
//!             // Substitute synthetic data
//!         }
//!         SourceErrorKind::InvalidRequest => {
//!             // Report to user
//!         }
//!         SourceErrorKind::Internal => {}
//!     }
//! }
//! ```

pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod sources;

pub use data_source::{SeriesSource, SourceError, SourceErrorKind, SourceId};

pub use domain::{
    format_date, parse_date, Interval, PricePoint, SeriesRequest, Symbol, TimeSeries, UtcDateTime,
};

pub use error::ValidationError;

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, OfflineHttpClient, ReqwestHttpClient,
    DEFAULT_TIMEOUT_MS,
};

pub use sources::{FallbackSource, SyntheticConfig, SyntheticSource, YahooSource};
