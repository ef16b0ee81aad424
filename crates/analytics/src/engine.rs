// In crates/analytics/src/engine.rs

use crate::types::{DrawdownPoint, EquityPoint, PnlPoint, Trade, TradeSeries};

/// Starting capital assumed when a run's own capital is not known.
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Builds the equity, drawdown and P&L series for a run from its trade list.
///
/// Every trade is treated as fully realized at its exit time; unrealized
/// effects are not modeled.
#[derive(Debug, Clone, Copy)]
pub struct SeriesBuilder {
    initial_capital: f64,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPITAL)
    }
}

impl SeriesBuilder {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Walks `trades` once, in the order given, and emits one point per trade
    /// into each series.
    ///
    /// Trades are not re-sorted and equal exit times are all kept. A `NaN`
    /// P&L poisons the running equity from that trade onwards; it never
    /// raises the peak.
    pub fn build(&self, trades: &[Trade]) -> TradeSeries {
        let mut series = TradeSeries {
            equity_curve: Vec::with_capacity(trades.len()),
            drawdown: Vec::with_capacity(trades.len()),
            pnl: Vec::with_capacity(trades.len()),
        };

        let mut equity = self.initial_capital;
        let mut peak_equity = self.initial_capital;

        for trade in trades {
            let time = trade.exit_time();

            // --- Equity & Peak ---
            equity += trade.net_profit_loss;
            if equity > peak_equity {
                peak_equity = equity;
            }

            // --- Drawdown ---
            let absolute_drawdown = peak_equity - equity;
            let drawdown_pct = if peak_equity > 0.0 {
                absolute_drawdown / peak_equity * 100.0
            } else {
                0.0
            };

            series.equity_curve.push(EquityPoint { time, equity });
            series.drawdown.push(DrawdownPoint {
                time,
                drawdown_pct,
                equity,
                absolute_drawdown,
                peak_equity,
            });
            series.pnl.push(PnlPoint {
                time,
                value: trade.net_profit_loss,
                is_profit: trade.net_profit_loss >= 0.0,
            });
        }

        series
    }
}
