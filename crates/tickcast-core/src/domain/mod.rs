//! # Domain Models
//!
//! Canonical domain types for tickcast price series.
//!
//! All models validate their invariants at construction time:
//!
//! | Type | Invariant |
//! |------|-----------|
//! | [`Symbol`] | Uppercase ticker, optional `.EXCHANGE` suffix |
//! | [`Interval`] | Daily or minute sampling |
//! | [`UtcDateTime`] | Instant held at UTC offset |
//! | [`PricePoint`] | Finite value |
//! | [`TimeSeries`] | Strictly increasing timestamps, no duplicates |
//! | [`SeriesRequest`] | `start <= end` |
//!
//! ```rust,ignore
//! use tickcast_core::{Interval, SeriesRequest, Symbol};
//! use tickcast_core::domain::parse_date;
//!
//! let request = SeriesRequest::new(
//!     Symbol::parse("INFY.NS")?,
//!     parse_date("2014-07-01")?,
//!     parse_date("2014-10-14")?,
//!     Interval::Daily,
//! )?;
//! ```

mod interval;
mod models;
mod symbol;
mod timestamp;

pub use interval::Interval;
pub use models::{PricePoint, SeriesRequest, TimeSeries};
pub use symbol::Symbol;
pub use timestamp::{format_date, parse_date, UtcDateTime};
