//! Display helpers shared by the CLI views

use chrono::{DateTime, Utc};

/// Shown for missing values
pub const EMPTY_DISPLAY: &str = "—";

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Compact market cap: `$1.23B`, `$4.5M`, `$12K`, `$999`
pub fn format_market_cap(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return EMPTY_DISPLAY.to_string();
    }
    if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        format!("${:.0}", value)
    }
}

/// `ABCD…WXYZ` for identifiers longer than 8 characters
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return EMPTY_DISPLAY.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Relative age in the largest whole unit: `42s`, `5m`, `3h`, `2d`
pub fn time_ago(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

/// One-line price chart
#[derive(Debug, Clone, PartialEq)]
pub struct Sparkline {
    pub line: String,
    /// Last point at or above the first
    pub rising: bool,
}

/// Render a series as block characters scaled between its min and max.
/// Needs at least two points.
pub fn sparkline(series: &[f64]) -> Option<Sparkline> {
    if series.len() < 2 {
        return None;
    }
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max - min > 0.0 { max - min } else { 1.0 };
    let top = (SPARK_LEVELS.len() - 1) as f64;

    let line = series
        .iter()
        .map(|v| {
            let level = (((v - min) / range) * top).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect();

    Some(Sparkline {
        line,
        rising: series[series.len() - 1] >= series[0],
    })
}
