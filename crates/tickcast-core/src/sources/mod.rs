//! Series source implementations.

mod fallback;
mod synthetic;
mod yahoo;

pub use fallback::FallbackSource;
pub use synthetic::{trading_timestamps, SyntheticConfig, SyntheticSource};
pub use yahoo::YahooSource;
