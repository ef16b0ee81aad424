// In crates/analytics/src/normalizer.rs

use crate::types::{RawTrade, Trade};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts the backtester has been seen to write. Read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Layouts carrying an explicit offset, e.g. pandas' `2024-01-05 00:00:00+00:00`.
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses a numeric CSV cell from its longest leading decimal number, so
/// `"250.0 USDT"` reads as `250` and `"1,000.5"` as `1`. Text without a
/// leading number is `NaN`. `Infinity` is the only non-finite spelling read.
pub fn parse_number(text: &str) -> f64 {
    let text = text.trim_start();
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    let sign_len = text.len() - unsigned.len();

    if unsigned.starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let len = decimal_prefix_len(unsigned.as_bytes());
    if len == 0 {
        return f64::NAN;
    }
    text[..sign_len + len].parse::<f64>().unwrap_or(f64::NAN)
}

/// Length of the leading `digits[.digits][e[+-]digits]` run; zero when no
/// mantissa digit is present.
fn decimal_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let integer = digits_from(0);
    let mut end = integer;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if integer + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integer + fraction == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exponent = digits_from(exp_start.min(bytes.len()));
        if exponent > 0 {
            end = exp_start + exponent;
        }
    }
    end
}

/// Parses a CSV date cell into a UTC timestamp.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Converts one raw CSV row into a `Trade`. Never fails.
pub fn normalize_trade(raw: &RawTrade) -> Trade {
    Trade {
        side: raw.trade_type.parse().ok(),
        entry_date: parse_timestamp(&raw.entry_date),
        exit_date: parse_timestamp(&raw.exit_date),
        entry_price: parse_number(&raw.entry_price),
        exit_price: parse_number(&raw.exit_price),
        quantity: parse_number(&raw.quantity),
        net_profit_loss: parse_number(&raw.net_profit_loss),
        net_profit_loss_pct: parse_number(&raw.net_profit_loss_pct),
        exit_reason: raw.exit_reason.clone(),
    }
}

/// Normalizes a whole trade list, preserving its order.
pub fn normalize_trades(raws: &[RawTrade]) -> Vec<Trade> {
    let trades: Vec<Trade> = raws.iter().map(normalize_trade).collect();

    let malformed = trades
        .iter()
        .filter(|t| !t.net_profit_loss.is_finite() || t.exit_date.is_none())
        .count();
    if malformed > 0 {
        tracing::warn!(
            malformed,
            total = trades.len(),
            "Some trade rows have an unreadable P&L or exit date."
        );
    }

    trades
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::Side;

    fn raw(net_profit_loss: &str, exit_date: &str) -> RawTrade {
        RawTrade {
            trade_type: "buy".to_string(),
            entry_date: "2024-01-01 00:00:00".to_string(),
            exit_date: exit_date.to_string(),
            entry_price: "42000.5".to_string(),
            exit_price: "43000".to_string(),
            quantity: "0.25".to_string(),
            net_profit_loss: net_profit_loss.to_string(),
            net_profit_loss_pct: "2.38".to_string(),
            exit_reason: "take_profit".to_string(),
        }
    }

    #[test]
    fn parses_a_well_formed_row() {
        let trade = normalize_trade(&raw("249.875", "2024-01-03 12:30:00"));

        assert_eq!(trade.side, Some(Side::Long));
        assert_eq!(
            trade.entry_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            trade.exit_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 12, 30, 0).unwrap())
        );
        assert_eq!(trade.entry_price, 42000.5);
        assert_eq!(trade.exit_price, 43000.0);
        assert_eq!(trade.quantity, 0.25);
        assert_eq!(trade.net_profit_loss, 249.875);
        assert_eq!(trade.net_profit_loss_pct, 2.38);
        assert_eq!(trade.exit_reason, "take_profit");
    }

    #[test]
    fn malformed_numbers_become_nan_instead_of_failing() {
        let trade = normalize_trade(&raw("abc12", "2024-01-03"));
        assert!(trade.net_profit_loss.is_nan());
        assert!(parse_number("").is_nan());
        assert_eq!(parse_number("  -17.5 "), -17.5);
    }

    #[test]
    fn numbers_are_read_from_their_leading_digits() {
        assert_eq!(parse_number("12abc"), 12.0);
        assert_eq!(parse_number("250.0 USDT"), 250.0);
        assert_eq!(parse_number("1,000.5"), 1.0);
        assert_eq!(parse_number("-.5e2x"), -50.0);
        assert_eq!(parse_number("3."), 3.0);
        assert_eq!(parse_number("7e"), 7.0);
        assert_eq!(parse_number("7e+"), 7.0);
        assert_eq!(parse_number("+4.25E-2"), 0.0425);
        assert_eq!(normalize_trade(&raw("12abc", "2024-01-03")).net_profit_loss, 12.0);
    }

    #[test]
    fn only_infinity_is_read_as_a_non_finite_number() {
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        for text in ["inf", "-inf", "nan", "NaN", "infinity", "+", "-", ".", "e5", "abc"] {
            assert!(parse_number(text).is_nan(), "{text:?}");
        }
    }

    #[test]
    fn unreadable_dates_and_sides_are_kept_as_none() {
        let mut row = raw("10", "not a date");
        row.trade_type = "hold".to_string();
        let trade = normalize_trade(&row);

        assert_eq!(trade.exit_date, None);
        assert_eq!(trade.exit_time(), None);
        assert_eq!(trade.side, None);
    }

    #[test]
    fn accepts_the_common_date_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 4, 0, 0).unwrap();
        for text in [
            "2024-03-09T04:00:00Z",
            "2024-03-09T09:30:00+05:30",
            "2024-03-09 04:00:00",
            "2024-03-09 04:00:00.000",
            "2024-03-09T04:00:00",
            "2024-03-09 04:00:00+00:00",
            "2024-03-09 04:00",
        ] {
            assert_eq!(parse_timestamp(text), Some(expected), "layout {text}");
        }
        assert_eq!(
            parse_timestamp("2024-03-09"),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn normalize_trades_preserves_order_and_length() {
        let raws = vec![raw("1", "2024-01-02"), raw("oops", "2024-01-01"), raw("3", "")];
        let trades = normalize_trades(&raws);

        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].net_profit_loss, 1.0);
        assert!(trades[1].net_profit_loss.is_nan());
        assert_eq!(trades[2].exit_date, None);
    }
}
