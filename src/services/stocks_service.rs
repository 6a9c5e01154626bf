use serde_json::{json, Value};

use crate::{error::ApiError, services::finnhub::QuoteResponse, AppState};

/// Symbols served by `GET /stocks`, with display names.
pub const TRACKED_SYMBOLS: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla Inc."),
    ("META", "Meta Platforms Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("NFLX", "Netflix Inc."),
];

fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

/// Day change relative to the previous close, in percent.
pub fn percent_change(current: f64, previous_close: f64) -> f64 {
    if previous_close == 0.0 {
        return 0.0;
    }
    (current - previous_close) / previous_close * 100.0
}

fn display_name(symbol: &str) -> &str {
    TRACKED_SYMBOLS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, name)| *name)
        .unwrap_or(symbol)
}

pub fn quote_entry(name: &str, symbol: &str, q: &QuoteResponse) -> Value {
    json!({
        "name": name,
        "symbol": symbol,
        "currentPrice": q.c,
        "percentChange": fmt2(percent_change(q.c, q.pc)),
        "high": q.h,
        "low": q.l,
    })
}

/// Fresh quotes for the whole tracked set; any feed failure fails the
/// request (no partial listing, no caching).
pub async fn list_overview(state: &AppState) -> Result<Vec<Value>, ApiError> {
    let mut entries = Vec::with_capacity(TRACKED_SYMBOLS.len());

    for (symbol, name) in TRACKED_SYMBOLS {
        let quote = state.finnhub.quote(symbol).await?;
        entries.push(quote_entry(name, symbol, &quote));
    }

    Ok(entries)
}

pub async fn quote_one(state: &AppState, symbol: &str) -> Result<Value, ApiError> {
    let sym = symbol.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ApiError::validation("symbol query parameter is required"));
    }

    let quote = state.finnhub.quote(&sym).await?;
    Ok(quote_entry(display_name(&sym), &sym, &quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(c: f64, pc: f64) -> QuoteResponse {
        QuoteResponse {
            c,
            d: c - pc,
            dp: 0.0,
            h: c + 1.0,
            l: c - 1.0,
            o: pc,
            pc,
            t: 0,
        }
    }

    #[test]
    fn percent_change_is_relative_to_previous_close() {
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(95.0, 100.0), -5.0);
        assert_eq!(percent_change(150.0, 0.0), 0.0);
    }

    #[test]
    fn quote_entry_formats_percent_change_with_two_decimals() {
        let entry = quote_entry("Apple Inc.", "AAPL", &quote(103.0, 100.0));
        assert_eq!(entry["percentChange"], "3.00");
        assert_eq!(entry["currentPrice"], 103.0);
        assert_eq!(entry["symbol"], "AAPL");

        let entry = quote_entry("Apple Inc.", "AAPL", &quote(100.0 + 1.0 / 3.0, 100.0));
        assert_eq!(entry["percentChange"], "0.33");
    }

    #[test]
    fn display_name_falls_back_to_the_symbol() {
        assert_eq!(display_name("AAPL"), "Apple Inc.");
        assert_eq!(display_name("ZZZZ"), "ZZZZ");
    }
}
