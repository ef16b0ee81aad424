// In crates/web-server/src/types.rs

use crate::format::FormattedMetric;
use crate::sections::SummarySection;
use analytics::{AggregateSummary, RunSummary, Trade};
use core_types::Mode;
use result_store::RawBar;
use serde::{Deserialize, Serialize};

/// The `?mode=backtest|live` query parameter shared by the result endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ModeParams {
    pub mode: Option<Mode>,
}

/// Everything the result page needs for one named result.
#[derive(Debug, Serialize)]
pub struct ResultDetails {
    pub name: String,
    pub summary: RunSummary,
    pub sections: Vec<SummarySection>,
    pub trades: Vec<Trade>,
    pub raw_data: Vec<RawBar>,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub aggregate: AggregateSummary,
    pub formatted: Vec<FormattedMetric>,
}

#[derive(Debug, Serialize)]
pub struct PingLogsResponse {
    /// Newest first.
    pub logs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
