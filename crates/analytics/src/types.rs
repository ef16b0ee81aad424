// In crates/analytics/src/types.rs

use chrono::{DateTime, Utc};
use core_types::Side;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a result CSV, exactly as the backtester wrote it.
///
/// Every field is kept as text; columns that are missing from the file read as
/// empty strings and columns this type does not name are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTrade {
    #[serde(rename = "type")]
    pub trade_type: String,
    pub entry_date: String,
    pub exit_date: String,
    pub entry_price: String,
    pub exit_price: String,
    pub quantity: String,
    pub net_profit_loss: String,
    pub net_profit_loss_pct: String,
    pub exit_reason: String,
}

/// A closed trade with its numeric fields parsed.
///
/// Malformed numbers are `NaN` and malformed dates are `None`; the record is
/// still produced so that one bad row never hides the rest of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    #[serde(rename = "type")]
    pub side: Option<Side>,
    pub entry_date: Option<DateTime<Utc>>,
    pub exit_date: Option<DateTime<Utc>>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub net_profit_loss: f64,
    pub net_profit_loss_pct: f64,
    pub exit_reason: String,
}

impl Trade {
    /// Entry time in Unix seconds.
    pub fn entry_time(&self) -> Option<i64> {
        self.entry_date.map(|d| d.timestamp())
    }

    /// Exit time in Unix seconds.
    pub fn exit_time(&self) -> Option<i64> {
        self.exit_date.map(|d| d.timestamp())
    }
}

/// Running capital after a trade has been realized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub time: Option<i64>,
    pub equity: f64,
}

/// Distance from the running equity peak after a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPoint {
    pub time: Option<i64>,
    pub drawdown_pct: f64,
    pub equity: f64,
    pub absolute_drawdown: f64,
    pub peak_equity: f64,
}

/// Realized profit or loss of a single trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PnlPoint {
    pub time: Option<i64>,
    pub value: f64,
    pub is_profit: bool,
}

/// The derived series for one run; all three vectors are index-aligned with
/// the trades they were built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeSeries {
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown: Vec<DrawdownPoint>,
    pub pnl: Vec<PnlPoint>,
}

impl TradeSeries {
    pub fn len(&self) -> usize {
        self.equity_curve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equity_curve.is_empty()
    }

    /// The deepest finite drawdown point of the run, if any.
    pub fn max_drawdown(&self) -> Option<&DrawdownPoint> {
        self.drawdown
            .iter()
            .filter(|p| p.absolute_drawdown.is_finite())
            .max_by(|a, b| a.absolute_drawdown.total_cmp(&b.absolute_drawdown))
    }

    /// Equity after the last trade.
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.equity)
    }
}

/// Metric names used in summary files.
pub mod fields {
    pub const INITIAL_CAPITAL: &str = "initial_capital";
    pub const FINAL_CAPITAL: &str = "final_capital";
    pub const NET_PROFIT: &str = "net_profit";
    pub const GROSS_PROFIT: &str = "gross_profit";
    pub const TOTAL_FEES_PAID: &str = "total_fees_paid";
    pub const TOTAL_RETURN_PCT: &str = "total_return_pct";
    pub const TOTAL_TRADES: &str = "total_trades";
    pub const WINNING_TRADES: &str = "winning_trades";
    pub const LOSING_TRADES: &str = "losing_trades";
    pub const BREAKEVEN_TRADES: &str = "breakeven_trades";
    pub const WIN_RATE: &str = "win_rate";
    pub const AVG_PROFIT_PER_WIN: &str = "avg_profit_per_win";
    pub const AVG_LOSS_PER_LOSS: &str = "avg_loss_per_loss";
    pub const MAX_WIN: &str = "max_win";
    pub const MAX_LOSS: &str = "max_loss";
    pub const BEST_TRADE: &str = "best_trade";
    pub const WORST_TRADE: &str = "worst_trade";
    pub const AVG_TRADE: &str = "avg_trade";
    pub const MAX_DRAWDOWN: &str = "max_drawdown";
    pub const MAX_DRAWDOWN_PCT: &str = "max_drawdown_pct";
    pub const SHARPE_RATIO: &str = "sharpe_ratio";
    pub const PROFIT_FACTOR: &str = "profit_factor";
    pub const EXPECTANCY: &str = "expectancy";
    pub const TOTAL_LONG_TRADES: &str = "total_long_trades";
    pub const TOTAL_SHORT_TRADES: &str = "total_short_trades";
    pub const LONG_WIN_RATE: &str = "long_win_rate";
    pub const SHORT_WIN_RATE: &str = "short_win_rate";
    pub const MAX_CONSECUTIVE_WINS: &str = "max_consecutive_wins";
    pub const MAX_CONSECUTIVE_LOSSES: &str = "max_consecutive_losses";
    pub const CURRENT_STREAK: &str = "current_streak";
    pub const CURRENT_STREAK_TYPE: &str = "current_streak_type";
    pub const AVG_TRADE_DURATION: &str = "avg_trade_duration";
    pub const SYMBOL: &str = "symbol";
    pub const TIMEFRAME: &str = "timeframe";
}

/// The metrics one backtest run wrote to its summary file.
///
/// Stored as the flat JSON object it was read from so that fields this crate
/// does not know about survive a round trip to the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSummary(Map<String, Value>);

impl RunSummary {
    pub fn new(metrics: Map<String, Value>) -> Self {
        Self(metrics)
    }

    /// Reads a numeric metric. Missing or non-numeric values count as zero.
    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Reads a numeric metric, distinguishing "absent" from zero.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RunSummary {
    fn from(metrics: Map<String, Value>) -> Self {
        Self(metrics)
    }
}

/// A run summary together with the result name it was loaded under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSummary {
    pub name: String,
    #[serde(flatten)]
    pub summary: RunSummary,
}

/// The cross-run combination of several `RunSummary` records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_runs: usize,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub net_profit: f64,
    pub total_fees_paid: f64,
    pub total_return_pct: f64,
    pub total_trades: f64,
    pub winning_trades: f64,
    pub losing_trades: f64,
    pub breakeven_trades: f64,
    pub win_rate: f64,
    pub avg_profit_per_win: f64,
    pub avg_loss_per_loss: f64,
    pub max_win: f64,
    pub max_loss: f64,
    pub avg_trade: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    pub total_long_trades: f64,
    pub total_short_trades: f64,
    pub long_win_rate: f64,
    pub short_win_rate: f64,
    pub max_consecutive_wins: f64,
    pub max_consecutive_losses: f64,
    pub avg_trade_duration: f64,
}

impl AggregateSummary {
    /// Every metric with its summary-file name, in display order.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        use fields::*;
        vec![
            ("total_runs", self.total_runs as f64),
            (INITIAL_CAPITAL, self.initial_capital),
            (FINAL_CAPITAL, self.final_capital),
            (NET_PROFIT, self.net_profit),
            (TOTAL_FEES_PAID, self.total_fees_paid),
            (TOTAL_RETURN_PCT, self.total_return_pct),
            (TOTAL_TRADES, self.total_trades),
            (WINNING_TRADES, self.winning_trades),
            (LOSING_TRADES, self.losing_trades),
            (BREAKEVEN_TRADES, self.breakeven_trades),
            (WIN_RATE, self.win_rate),
            (AVG_PROFIT_PER_WIN, self.avg_profit_per_win),
            (AVG_LOSS_PER_LOSS, self.avg_loss_per_loss),
            (MAX_WIN, self.max_win),
            (MAX_LOSS, self.max_loss),
            (AVG_TRADE, self.avg_trade),
            (MAX_DRAWDOWN_PCT, self.max_drawdown_pct),
            (SHARPE_RATIO, self.sharpe_ratio),
            (PROFIT_FACTOR, self.profit_factor),
            (EXPECTANCY, self.expectancy),
            (TOTAL_LONG_TRADES, self.total_long_trades),
            (TOTAL_SHORT_TRADES, self.total_short_trades),
            (LONG_WIN_RATE, self.long_win_rate),
            (SHORT_WIN_RATE, self.short_win_rate),
            (MAX_CONSECUTIVE_WINS, self.max_consecutive_wins),
            (MAX_CONSECUTIVE_LOSSES, self.max_consecutive_losses),
            (AVG_TRADE_DURATION, self.avg_trade_duration),
        ]
    }
}
