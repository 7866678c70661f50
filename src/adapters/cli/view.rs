//! Plain-text rendering of tokens for the terminal

use chrono::{DateTime, Utc};

use crate::application::PriceSeries;
use crate::domain::format::EMPTY_DISPLAY;
use crate::domain::{format_market_cap, short_address, sparkline, time_ago, Token};

const NAME_WIDTH: usize = 24;

/// One listing line: symbol, name, market value, age, short address
pub fn token_row(token: &Token, now: DateTime<Utc>) -> String {
    format!(
        "{:<10} {:<width$} {:>10} {:>6}  {}",
        truncate(&token.symbol, 10),
        truncate(&token.name, NAME_WIDTH),
        format_market_cap(token.market_value),
        age(token, now),
        short_address(&token.identifier),
        width = NAME_WIDTH,
    )
}

/// Multi-line token card, with a sparkline when a series is given
pub fn token_detail(token: &Token, now: DateTime<Utc>, series: Option<&PriceSeries>) -> String {
    let mut lines = vec![
        format!("{} ({})", token.name, token.symbol),
        format!("  Address:    {}", token.identifier),
        format!("  Market cap: {}", format_market_cap(token.market_value)),
        format!("  Price:      {}", price(token.price_usd)),
        format!("  Liquidity:  {}", format_market_cap(token.liquidity)),
        format!("  Age:        {}", age(token, now)),
        format!("  Creator:    {}", token.creator_display),
        format!("  {}", token.description),
    ];

    if let Some(series) = series {
        lines.push(history_line(series));
    }
    lines.join("\n")
}

/// Sparkline plus direction; synthetic series are labelled
pub fn history_line(series: &PriceSeries) -> String {
    let label = if series.synthetic { "Chart (no data)" } else { "Chart" };
    match sparkline(&series.points) {
        Some(spark) => format!(
            "  {}: {} {}",
            label,
            spark.line,
            if spark.rising { "▲" } else { "▼" }
        ),
        None => format!("  {}: {}", label, EMPTY_DISPLAY),
    }
}

fn age(token: &Token, now: DateTime<Utc>) -> String {
    token
        .created_at_utc()
        .map(|created| time_ago(created, now))
        .unwrap_or_else(|| EMPTY_DISPLAY.to_string())
}

fn price(value: f64) -> String {
    if value > 0.0 {
        format!("${:.8}", value)
    } else {
        EMPTY_DISPLAY.to_string()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}
