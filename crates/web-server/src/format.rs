// In crates/web-server/src/format.rs

use analytics::types::fields;
use rust_decimal::prelude::*;
use serde::Serialize;

/// Shown in place of values that cannot be displayed.
pub const NOT_AVAILABLE: &str = "N/A";

/// How a metric is rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Currency,
    Percentage,
    Number,
    /// A span of hours, shown in hours or days.
    Duration,
}

impl ValueKind {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueKind::Currency => format_currency(value),
            ValueKind::Percentage => format_percentage(value),
            ValueKind::Number => format_number(value, 2),
            ValueKind::Duration => format_duration(value),
        }
    }
}

/// A metric ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedMetric {
    pub key: String,
    pub label: String,
    pub kind: ValueKind,
    pub value: f64,
    pub display: String,
}

impl FormattedMetric {
    pub fn new(key: &str, kind: ValueKind, value: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label_for(key),
            kind,
            value,
            display: kind.format(value),
        }
    }
}

/// `max_drawdown_pct` -> `max drawdown pct`
pub fn label_for(key: &str) -> String {
    key.replace('_', " ")
}

/// Picks the display kind of a summary metric from its name.
pub fn metric_kind(key: &str) -> ValueKind {
    use fields::*;
    match key {
        INITIAL_CAPITAL | FINAL_CAPITAL | NET_PROFIT | GROSS_PROFIT | TOTAL_FEES_PAID
        | AVG_PROFIT_PER_WIN | AVG_LOSS_PER_LOSS | MAX_WIN | MAX_LOSS | BEST_TRADE
        | WORST_TRADE | AVG_TRADE | MAX_DRAWDOWN | EXPECTANCY => ValueKind::Currency,
        TOTAL_RETURN_PCT | WIN_RATE | MAX_DRAWDOWN_PCT | LONG_WIN_RATE | SHORT_WIN_RATE => {
            ValueKind::Percentage
        }
        AVG_TRADE_DURATION => ValueKind::Duration,
        _ => ValueKind::Number,
    }
}

/// Formats every metric by its name, keeping the given order.
pub fn format_metrics(metrics: &[(&str, f64)]) -> Vec<FormattedMetric> {
    metrics
        .iter()
        .map(|(key, value)| FormattedMetric::new(key, metric_kind(key), *value))
        .collect()
}

/// Groups thousands and keeps at most `max_fraction_digits` decimals,
/// dropping trailing zeros: `1234.5678` -> `1,234.57`.
pub fn format_number(value: f64, max_fraction_digits: u32) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let Some(decimal) = Decimal::from_f64(value) else {
        // Outside the decimal range; nothing sensible to group.
        return format!("{:.*}", max_fraction_digits as usize, value);
    };

    let rounded = decimal
        .round_dp_with_strategy(max_fraction_digits, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let digits = rounded.abs().to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let amount = format_number(value.abs(), 2);
    if value < 0.0 && amount != "0" {
        format!("-${amount}")
    } else {
        format!("${amount}")
    }
}

pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}%", format_number(value, 2))
}

/// Shows a span of hours in hours below one day, in days otherwise.
pub fn format_duration(hours: f64) -> String {
    if !hours.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if hours < 24.0 {
        format!("{} hours", format_number(hours, 1))
    } else {
        format!("{} days", format_number(hours / 24.0, 1))
    }
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn numbers_are_grouped_and_trimmed() {
        assert_eq!(format_number(1234.5678, 2), "1,234.57");
        assert_eq!(format_number(1234.5, 2), "1,234.5");
        assert_eq!(format_number(1_000_000.0, 2), "1,000,000");
        assert_eq!(format_number(999.999, 2), "1,000");
        assert_eq!(format_number(-42_000.126, 2), "-42,000.13");
        assert_eq!(format_number(-0.001, 2), "0");
        assert_eq!(format_number(12.25, 1), "12.3");
        assert_eq!(format_number(f64::NAN, 2), NOT_AVAILABLE);
    }

    #[test]
    fn rounding_matches_decimal_half_away_from_zero() {
        let half = dec!(0.125).to_f64().unwrap();
        assert_eq!(format_number(half, 2), "0.13");
        assert_eq!(format_number(-half, 2), "-0.13");
    }

    #[test]
    fn currency_and_percentages() {
        assert_eq!(format_currency(101_000.0), "$101,000");
        assert_eq!(format_currency(-2000.5), "-$2,000.5");
        assert_eq!(format_currency(-0.001), "$0");
        assert_eq!(format_percentage(1.980198), "1.98%");
        assert_eq!(format_percentage(f64::INFINITY), NOT_AVAILABLE);
    }

    #[test]
    fn durations_switch_to_days_after_a_day() {
        assert_eq!(format_duration(5.25), "5.3 hours");
        assert_eq!(format_duration(23.9), "23.9 hours");
        assert_eq!(format_duration(36.0), "1.5 days");
    }

    #[test]
    fn metric_kinds_follow_the_field_name() {
        assert_eq!(metric_kind("net_profit"), ValueKind::Currency);
        assert_eq!(metric_kind("win_rate"), ValueKind::Percentage);
        assert_eq!(metric_kind("avg_trade_duration"), ValueKind::Duration);
        assert_eq!(metric_kind("sharpe_ratio"), ValueKind::Number);
        assert_eq!(metric_kind("total_runs"), ValueKind::Number);

        let formatted = format_metrics(&[("max_drawdown_pct", 7.0), ("total_trades", 1234.0)]);
        assert_eq!(formatted[0].label, "max drawdown pct");
        assert_eq!(formatted[0].display, "7%");
        assert_eq!(formatted[1].display, "1,234");
    }
}
