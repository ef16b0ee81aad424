// In crates/web-server/src/sections.rs

use crate::format::{label_for, ValueKind, NOT_AVAILABLE};
use analytics::types::fields::*;
use analytics::RunSummary;
use serde::Serialize;

/// One titled group of the run summary view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySection {
    pub title: &'static str,
    pub items: Vec<SummaryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryItem {
    pub key: &'static str,
    pub label: String,
    pub display: String,
}

impl SummaryItem {
    fn metric(summary: &RunSummary, key: &'static str, kind: ValueKind) -> Self {
        Self::computed(key, summary.number(key), kind)
    }

    fn computed(key: &'static str, value: Option<f64>, kind: ValueKind) -> Self {
        Self {
            key,
            label: label_for(key),
            display: value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| kind.format(v)),
        }
    }
}

/// Splits a run summary into the groups shown on the result page.
///
/// The duration group only appears when the run reports a positive average
/// trade duration.
pub fn summary_sections(summary: &RunSummary) -> Vec<SummarySection> {
    use ValueKind::*;
    let item = |key, kind| SummaryItem::metric(summary, key, kind);

    // Recomputed from the capital figures rather than trusted from the file.
    let total_return_pct = match (summary.number(FINAL_CAPITAL), summary.number(INITIAL_CAPITAL)) {
        (Some(final_capital), Some(initial)) if initial != 0.0 => {
            Some((final_capital / initial - 1.0) * 100.0)
        }
        _ => None,
    };

    let current_streak = match (summary.raw(CURRENT_STREAK), summary.text(CURRENT_STREAK_TYPE)) {
        (None, None) => NOT_AVAILABLE.to_string(),
        (streak, kind) => {
            let streak = streak.map(|v| v.to_string()).unwrap_or_default();
            format!("{} {}", streak, kind.unwrap_or_default()).trim().to_string()
        }
    };

    let mut sections = vec![
        SummarySection {
            title: "Overall Performance",
            items: vec![
                item(INITIAL_CAPITAL, Currency),
                item(FINAL_CAPITAL, Currency),
                item(NET_PROFIT, Currency),
                item(GROSS_PROFIT, Currency),
                item(TOTAL_FEES_PAID, Currency),
                SummaryItem::computed(TOTAL_RETURN_PCT, total_return_pct, Percentage),
            ],
        },
        SummarySection {
            title: "Trade Statistics",
            items: vec![
                item(TOTAL_TRADES, Number),
                item(WINNING_TRADES, Number),
                item(LOSING_TRADES, Number),
                item(BREAKEVEN_TRADES, Number),
                item(WIN_RATE, Percentage),
            ],
        },
        SummarySection {
            title: "Profit & Loss Metrics",
            items: vec![
                item(AVG_TRADE, Currency),
                item(AVG_PROFIT_PER_WIN, Currency),
                item(AVG_LOSS_PER_LOSS, Currency),
                item(MAX_WIN, Currency),
                item(MAX_LOSS, Currency),
                item(BEST_TRADE, Currency),
                item(WORST_TRADE, Currency),
            ],
        },
        SummarySection {
            title: "Risk & Drawdown",
            items: vec![
                item(MAX_DRAWDOWN, Currency),
                item(MAX_DRAWDOWN_PCT, Percentage),
                item(SHARPE_RATIO, Number),
                item(PROFIT_FACTOR, Number),
                item(EXPECTANCY, Number),
            ],
        },
        SummarySection {
            title: "Long/Short Analysis",
            items: vec![
                item(TOTAL_LONG_TRADES, Number),
                item(TOTAL_SHORT_TRADES, Number),
                item(LONG_WIN_RATE, Percentage),
                item(SHORT_WIN_RATE, Percentage),
            ],
        },
        SummarySection {
            title: "Consecutive Trades",
            items: vec![
                item(MAX_CONSECUTIVE_WINS, Number),
                item(MAX_CONSECUTIVE_LOSSES, Number),
                SummaryItem {
                    key: CURRENT_STREAK,
                    label: label_for(CURRENT_STREAK),
                    display: current_streak,
                },
            ],
        },
    ];

    if summary.get(AVG_TRADE_DURATION) > 0.0 {
        sections.push(SummarySection {
            title: "Duration Analysis",
            items: vec![item(AVG_TRADE_DURATION, Duration)],
        });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn find<'a>(sections: &'a [SummarySection], key: &str) -> &'a SummaryItem {
        sections
            .iter()
            .flat_map(|s| s.items.iter())
            .find(|i| i.key == key)
            .unwrap()
    }

    #[test]
    fn groups_and_formats_a_full_summary() {
        let summary: RunSummary = serde_json::from_value(json!({
            "initial_capital": 100000, "final_capital": 112345.678, "net_profit": 12345.678,
            "win_rate": 55.556, "sharpe_ratio": 1.23456, "max_drawdown": 2500,
            "current_streak": 3, "current_streak_type": "wins", "avg_trade_duration": 50.0
        }))
        .unwrap();

        let sections = summary_sections(&summary);
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                "Overall Performance",
                "Trade Statistics",
                "Profit & Loss Metrics",
                "Risk & Drawdown",
                "Long/Short Analysis",
                "Consecutive Trades",
                "Duration Analysis",
            ]
        );

        assert_eq!(find(&sections, "final_capital").display, "$112,345.68");
        assert_eq!(find(&sections, "total_return_pct").display, "12.35%");
        assert_eq!(find(&sections, "win_rate").display, "55.56%");
        assert_eq!(find(&sections, "sharpe_ratio").display, "1.23");
        assert_eq!(find(&sections, "max_drawdown").display, "$2,500");
        assert_eq!(find(&sections, "current_streak").display, "3 wins");
        assert_eq!(find(&sections, "avg_trade_duration").display, "2.1 days");
        assert_eq!(find(&sections, "best_trade").display, NOT_AVAILABLE);
    }

    #[test]
    fn duration_group_is_hidden_without_a_duration() {
        let summary: RunSummary = serde_json::from_value(json!({ "total_trades": 0 })).unwrap();
        let sections = summary_sections(&summary);

        assert!(sections.iter().all(|s| s.title != "Duration Analysis"));
        assert_eq!(find(&sections, "total_return_pct").display, NOT_AVAILABLE);
        assert_eq!(find(&sections, "current_streak").display, NOT_AVAILABLE);
    }
}
