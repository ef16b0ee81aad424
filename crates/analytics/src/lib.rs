// In crates/analytics/src/lib.rs

pub mod aggregate;
pub mod engine;
pub mod normalizer;
pub mod types;

// Re-export the most important types for easy access.
pub use aggregate::aggregate_summaries;
pub use engine::{SeriesBuilder, DEFAULT_INITIAL_CAPITAL};
pub use normalizer::{normalize_trade, normalize_trades};
pub use types::{
    AggregateSummary, DrawdownPoint, EquityPoint, NamedSummary, PnlPoint, RawTrade, RunSummary,
    Trade, TradeSeries,
};
