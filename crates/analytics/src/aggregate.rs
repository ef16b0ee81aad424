// In crates/analytics/src/aggregate.rs

use crate::types::{fields, AggregateSummary, RunSummary};

/// Combines several run summaries into one cross-run summary.
///
/// Counts and currency totals are summed; rates, ratios and per-trade
/// averages are averaged over the number of runs. Returns `None` when there
/// are no runs to combine.
///
/// Every run is assumed to have started from the first run's initial capital,
/// and the long/short win rates are plain averages of the per-run rates rather
/// than being recomputed from trade counts.
pub fn aggregate_summaries(runs: &[RunSummary]) -> Option<AggregateSummary> {
    let first = runs.first()?;
    let total_runs = runs.len();
    let n = total_runs as f64;

    let sum = |key: &str| -> f64 { runs.iter().map(|run| run.get(key)).sum() };
    let mean = |key: &str| -> f64 { sum(key) / n };

    // --- Capital & Returns ---
    let initial_capital = first.get(fields::INITIAL_CAPITAL) * n;
    let net_profit = sum(fields::NET_PROFIT);
    let final_capital = initial_capital + net_profit;
    let total_return_pct = if initial_capital != 0.0 {
        net_profit / initial_capital * 100.0
    } else {
        0.0
    };

    // --- Trade Counts ---
    let total_trades = sum(fields::TOTAL_TRADES);
    let winning_trades = sum(fields::WINNING_TRADES);
    let win_rate = if total_trades > 0.0 {
        winning_trades / total_trades * 100.0
    } else {
        0.0
    };

    let aggregate = AggregateSummary {
        total_runs,
        initial_capital,
        final_capital,
        net_profit,
        total_fees_paid: sum(fields::TOTAL_FEES_PAID),
        total_return_pct,
        total_trades,
        winning_trades,
        losing_trades: sum(fields::LOSING_TRADES),
        breakeven_trades: sum(fields::BREAKEVEN_TRADES),
        win_rate,
        avg_profit_per_win: mean(fields::AVG_PROFIT_PER_WIN),
        avg_loss_per_loss: mean(fields::AVG_LOSS_PER_LOSS),
        max_win: mean(fields::MAX_WIN),
        max_loss: mean(fields::MAX_LOSS),
        avg_trade: mean(fields::AVG_TRADE),
        max_drawdown_pct: mean(fields::MAX_DRAWDOWN_PCT),
        sharpe_ratio: mean(fields::SHARPE_RATIO),
        profit_factor: mean(fields::PROFIT_FACTOR),
        expectancy: mean(fields::EXPECTANCY),
        total_long_trades: sum(fields::TOTAL_LONG_TRADES),
        total_short_trades: sum(fields::TOTAL_SHORT_TRADES),
        long_win_rate: mean(fields::LONG_WIN_RATE),
        short_win_rate: mean(fields::SHORT_WIN_RATE),
        max_consecutive_wins: mean(fields::MAX_CONSECUTIVE_WINS),
        max_consecutive_losses: mean(fields::MAX_CONSECUTIVE_LOSSES),
        avg_trade_duration: mean(fields::AVG_TRADE_DURATION),
    };

    tracing::debug!(
        total_runs,
        net_profit = aggregate.net_profit,
        win_rate = aggregate.win_rate,
        "Aggregated run summaries."
    );

    Some(aggregate)
}
