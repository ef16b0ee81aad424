// In crates/web-server/src/charts.rs

use analytics::normalizer::{parse_number, parse_timestamp};
use analytics::{Trade, TradeSeries};
use core_types::Side;
use result_store::RawBar;
use serde::Serialize;

pub const UP_COLOR: &str = "rgba(38, 166, 154, 0.5)";
pub const DOWN_COLOR: &str = "rgba(239, 83, 80, 0.5)";
pub const MARKER_GREEN: &str = "#00FF00";
pub const MARKER_RED: &str = "#FF0000";

/// One parsed OHLCV bar, time in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Parses a raw row. Rows without a usable time or with any non-finite
    /// price or volume are rejected.
    pub fn from_raw(raw: &RawBar) -> Option<Self> {
        let bar = Self {
            time: bar_time(raw)?,
            open: parse_number(&raw.open),
            high: parse_number(&raw.high),
            low: parse_number(&raw.low),
            close: parse_number(&raw.close),
            volume: parse_number(&raw.volume),
        };
        [bar.open, bar.high, bar.low, bar.close, bar.volume]
            .iter()
            .all(|v| v.is_finite())
            .then_some(bar)
    }
}

/// `timestamp` is epoch milliseconds; otherwise `date` or `Date` is parsed.
fn bar_time(raw: &RawBar) -> Option<i64> {
    if !raw.timestamp.trim().is_empty() {
        let millis = parse_number(&raw.timestamp);
        return millis.is_finite().then(|| (millis / 1000.0).floor() as i64);
    }
    let date = if raw.date.trim().is_empty() {
        &raw.date_upper
    } else {
        &raw.date
    };
    parse_timestamp(date).map(|d| d.timestamp())
}

/// Parses and time-sorts a raw price series, dropping unusable rows.
pub fn price_bars(raw: &[RawBar]) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = raw.iter().filter_map(PriceBar::from_raw).collect();
    let dropped = raw.len() - bars.len();
    if dropped > 0 {
        tracing::debug!(dropped, "Dropped unusable price rows.");
    }
    bars.sort_by_key(|b| b.time);
    bars
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// A colored bar: volume under a candle, or one trade's realized P&L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBar {
    pub time: i64,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    BelowBar,
    AboveBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeMarker {
    pub time: i64,
    pub position: MarkerPosition,
    pub color: &'static str,
    pub shape: MarkerShape,
    pub text: &'static str,
}

impl TradeMarker {
    /// Trades with an unknown side are drawn as shorts.
    fn entry(side: Option<Side>, time: i64) -> Self {
        if side.is_some_and(Side::is_long) {
            Self {
                time,
                position: MarkerPosition::BelowBar,
                color: MARKER_GREEN,
                shape: MarkerShape::ArrowUp,
                text: "L",
            }
        } else {
            Self {
                time,
                position: MarkerPosition::AboveBar,
                color: MARKER_RED,
                shape: MarkerShape::ArrowDown,
                text: "S",
            }
        }
    }

    fn exit(side: Option<Side>, time: i64) -> Self {
        if side.is_some_and(Side::is_long) {
            Self {
                time,
                position: MarkerPosition::AboveBar,
                color: MARKER_RED,
                shape: MarkerShape::ArrowDown,
                text: "E",
            }
        } else {
            Self {
                time,
                position: MarkerPosition::BelowBar,
                color: MARKER_GREEN,
                shape: MarkerShape::ArrowUp,
                text: "E",
            }
        }
    }
}

/// The bar time in `times` (sorted ascending) closest to `target`.
/// Ties go to the earlier bar.
pub fn nearest_time(times: &[i64], target: i64) -> Option<i64> {
    let idx = times.partition_point(|&t| t < target);
    let before = idx.checked_sub(1).map(|i| times[i]);
    let after = times.get(idx).copied();

    match (before, after) {
        (Some(b), Some(a)) => {
            if target.abs_diff(b) <= a.abs_diff(target) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (b, a) => b.or(a),
    }
}

/// Entry and exit markers for every trade, snapped onto the candle axis and
/// sorted by time.
pub fn trade_markers(trades: &[Trade], times: &[i64]) -> Vec<TradeMarker> {
    let mut markers = Vec::with_capacity(trades.len() * 2);
    for trade in trades {
        if let Some(time) = trade.entry_time().and_then(|t| nearest_time(times, t)) {
            markers.push(TradeMarker::entry(trade.side, time));
        }
        if let Some(time) = trade.exit_time().and_then(|t| nearest_time(times, t)) {
            markers.push(TradeMarker::exit(trade.side, time));
        }
    }
    markers.sort_by_key(|m| m.time);
    markers
}

/// One bar per trade with a known time and finite P&L.
pub fn pnl_bars(series: &TradeSeries) -> Vec<HistogramBar> {
    series
        .pnl
        .iter()
        .filter(|p| p.value.is_finite())
        .filter_map(|p| {
            Some(HistogramBar {
                time: p.time?,
                value: p.value,
                color: if p.value >= 0.0 { UP_COLOR } else { DOWN_COLOR },
            })
        })
        .collect()
}

/// The price chart of one result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub candles: Vec<Candle>,
    pub volume: Vec<HistogramBar>,
    pub markers: Vec<TradeMarker>,
    pub pnl: Vec<HistogramBar>,
}

impl ChartData {
    pub fn build(raw: &[RawBar], trades: &[Trade], series: &TradeSeries) -> Self {
        let bars = price_bars(raw);
        let times: Vec<i64> = bars.iter().map(|b| b.time).collect();

        let candles = bars
            .iter()
            .map(|b| Candle {
                time: b.time,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
            })
            .collect();
        let volume = bars
            .iter()
            .map(|b| HistogramBar {
                time: b.time,
                value: b.volume,
                color: if b.close > b.open { UP_COLOR } else { DOWN_COLOR },
            })
            .collect();

        Self {
            candles,
            volume,
            markers: trade_markers(trades, &times),
            pnl: pnl_bars(series),
        }
    }
}
