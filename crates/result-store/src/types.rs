// In crates/result-store/src/types.rs

use crate::{Error, Result};
use analytics::{RawTrade, RunSummary};
use serde::{Deserialize, Serialize};

/// A validated result name, e.g. `BTC-USDT_1d_2024`.
///
/// By convention the first `_`-separated part is the symbol and the second is
/// the timeframe; the rest is free-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultName {
    name: String,
}

impl ResultName {
    /// Rejects names that could escape the data directory.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.contains('\0');
        if invalid {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The symbol part, e.g. `BTC-USDT`.
    pub fn symbol(&self) -> &str {
        self.name.split('_').next().unwrap_or_default()
    }

    /// The timeframe part, e.g. `1d`, if the name has one.
    pub fn timeframe(&self) -> Option<&str> {
        self.name.split('_').nth(1).filter(|tf| !tf.is_empty())
    }

    /// File stem of the processed price series for this result,
    /// e.g. `btcusdt_1d` for `BTC-USDT_1d_2024`.
    pub fn price_series_stem(&self) -> Option<String> {
        let timeframe = self.timeframe()?;
        let symbol = self.symbol().to_lowercase().replacen('-', "", 1);
        Some(format!("{symbol}_{timeframe}"))
    }
}

/// One OHLCV row of a processed price file, as text.
///
/// Files carry either an epoch-millisecond `timestamp` or a `date`/`Date`
/// column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBar {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(rename = "Date", skip_serializing_if = "String::is_empty")]
    pub date_upper: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

/// Everything stored for a single named result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    pub name: String,
    pub summary: RunSummary,
    pub trades: Vec<RawTrade>,
    pub raw_data: Vec<RawBar>,
}
