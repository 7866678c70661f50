//! Record Normalizer
//!
//! Maps a heterogeneous upstream record onto the canonical [`Token`] shape.
//!
//! The listing sub-feeds and the pair lookup all spell their fields
//! differently, so each canonical field is resolved from an ordered list of
//! JSON paths. The first path holding a present value wins. A value is
//! present when it is not null, `false`, `0`, `NaN` or an empty string.
//!
//! Resolution order per field:
//! - identifier: `tokenAddress`, `mint`, `address`, `baseToken.address`
//! - name: `name`, `baseToken.name`, then `"Unknown"`
//! - symbol: `symbol`, `baseToken.symbol`, then first 6 chars of identifier upper-cased, then `"TKN"`
//! - image: `logo`, `tokenImageUrl`, `baseToken.tokenImageUrl`, then placeholder
//! - market value: `fullyDilutedValuation`, `marketCap`, then 0
//! - price: `priceUsd`, `price`, then 0
//! - liquidity: `liquidity`, `volume`, then 0
//! - created at: `createdAt`, `graduatedAt`, then normalization time
//! - description: `description`, `baseToken.name`, then `"Pump.fun token"`

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use tracing::trace;

use super::format::short_address;
use super::token::{Token, DEFAULT_DESCRIPTION, PLACEHOLDER_IMAGE};

/// Path into a JSON record, e.g. `["baseToken", "address"]`
pub type FieldPath = &'static [&'static str];

/// Ordered extraction rule for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Canonical field name, used in logs
    pub field: &'static str,
    /// Candidate paths, tried in order
    pub paths: &'static [FieldPath],
}

impl FieldRule {
    pub const fn new(field: &'static str, paths: &'static [FieldPath]) -> Self {
        Self { field, paths }
    }

    /// First present value along the rule's paths
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let found = self
            .paths
            .iter()
            .filter_map(|path| lookup(record, path))
            .find(|value| is_present(value));
        if found.is_none() {
            trace!("No value for {}, using fallback", self);
        }
        found
    }

    /// First present value that can be read as text
    pub fn resolve_text(&self, record: &Value) -> Option<String> {
        let found = self
            .paths
            .iter()
            .filter_map(|path| lookup(record, path))
            .filter(|value| is_present(value))
            .find_map(as_text);
        if found.is_none() {
            trace!("No text for {}, using fallback", self);
        }
        found
    }

    /// First present value coerced to a non-negative number.
    /// A present but non-numeric value yields 0 rather than falling through.
    pub fn resolve_amount(&self, record: &Value) -> f64 {
        self.resolve(record).map(coerce_amount).unwrap_or(0.0)
    }
}

impl std::fmt::Display for FieldRule {
    /// `symbol <- symbol | baseToken.symbol`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let paths: Vec<String> = self.paths.iter().map(|path| path.join(".")).collect();
        write!(f, "{} <- {}", self.field, paths.join(" | "))
    }
}

/// Full rule table used by the normalizer
#[derive(Debug, Clone)]
pub struct NormalizerRules {
    pub identifier: FieldRule,
    pub name: FieldRule,
    pub symbol: FieldRule,
    pub image: FieldRule,
    pub market_value: FieldRule,
    pub price_usd: FieldRule,
    pub liquidity: FieldRule,
    pub created_at: FieldRule,
    pub description: FieldRule,
}

pub const IDENTIFIER_RULE: FieldRule = FieldRule::new(
    "identifier",
    &[&["tokenAddress"], &["mint"], &["address"], &["baseToken", "address"]],
);
pub const NAME_RULE: FieldRule = FieldRule::new("name", &[&["name"], &["baseToken", "name"]]);
pub const SYMBOL_RULE: FieldRule = FieldRule::new("symbol", &[&["symbol"], &["baseToken", "symbol"]]);
pub const IMAGE_RULE: FieldRule = FieldRule::new(
    "image",
    &[&["logo"], &["tokenImageUrl"], &["baseToken", "tokenImageUrl"]],
);
pub const MARKET_VALUE_RULE: FieldRule =
    FieldRule::new("marketValue", &[&["fullyDilutedValuation"], &["marketCap"]]);
pub const PRICE_RULE: FieldRule = FieldRule::new("priceUsd", &[&["priceUsd"], &["price"]]);
pub const LIQUIDITY_RULE: FieldRule = FieldRule::new("liquidity", &[&["liquidity"], &["volume"]]);
pub const CREATED_AT_RULE: FieldRule = FieldRule::new("createdAt", &[&["createdAt"], &["graduatedAt"]]);
pub const DESCRIPTION_RULE: FieldRule =
    FieldRule::new("description", &[&["description"], &["baseToken", "name"]]);

impl Default for NormalizerRules {
    fn default() -> Self {
        Self {
            identifier: IDENTIFIER_RULE,
            name: NAME_RULE,
            symbol: SYMBOL_RULE,
            image: IMAGE_RULE,
            market_value: MARKET_VALUE_RULE,
            price_usd: PRICE_RULE,
            liquidity: LIQUIDITY_RULE,
            created_at: CREATED_AT_RULE,
            description: DESCRIPTION_RULE,
        }
    }
}

/// Name used when no rule resolves
const UNKNOWN_NAME: &str = "Unknown";
/// Symbol used when neither a symbol nor an identifier exists
const UNKNOWN_SYMBOL: &str = "TKN";
/// Characters of the identifier used as a fallback symbol
const SYMBOL_FALLBACK_LEN: usize = 6;

/// Pure record normalizer
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: NormalizerRules,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer with a custom rule table
    pub fn with_rules(rules: NormalizerRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NormalizerRules {
        &self.rules
    }

    /// Normalize one upstream record.
    ///
    /// `now` is only used when the record carries no creation timestamp.
    pub fn normalize(&self, record: &Value, now: DateTime<Utc>) -> Token {
        let rules = &self.rules;

        let identifier = rules.identifier.resolve_text(record).unwrap_or_default();

        let name = rules
            .name
            .resolve_text(record)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let symbol = rules
            .symbol
            .resolve_text(record)
            .unwrap_or_else(|| fallback_symbol(&identifier));

        let image = sanitize_image_url(rules.image.resolve_text(record).as_deref());

        let created_at = rules
            .created_at
            .resolve(record)
            .and_then(as_timestamp)
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

        let description = rules
            .description
            .resolve_text(record)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        Token {
            name,
            symbol,
            image,
            market_value: rules.market_value.resolve_amount(record),
            price_usd: rules.price_usd.resolve_amount(record),
            liquidity: rules.liquidity.resolve_amount(record),
            created_at,
            description,
            creator_display: short_address(&identifier),
            avatar: PLACEHOLDER_IMAGE.to_string(),
            change_percent: 0.0,
            comment_count: 0,
            nsfw: false,
            source: None,
            identifier,
        }
    }
}

/// Replace a missing or broken image URL with the bundled placeholder
pub fn sanitize_image_url(url: Option<&str>) -> String {
    match url {
        Some(u) if !u.is_empty() && !u.contains("null") && !u.contains("undefined") => u.to_string(),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

fn fallback_symbol(identifier: &str) -> String {
    if identifier.is_empty() {
        return UNKNOWN_SYMBOL.to_string();
    }
    identifier
        .chars()
        .take(SYMBOL_FALLBACK_LEN)
        .collect::<String>()
        .to_uppercase()
}

fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |node, key| node.get(*key))
}

/// Truthiness test for a resolved value: null, `false`, `0`, `NaN` and
/// `""` are absent
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric coercion: numbers and numeric strings pass, anything else is 0.
/// Negative and non-finite amounts clamp to 0.
fn coerce_amount(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Timestamps arrive as ISO strings; numeric epochs are accepted in
/// seconds or milliseconds and rendered as RFC 3339.
fn as_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let raw = n.as_f64()?;
            let millis = if raw.abs() < 1e12 { raw * 1000.0 } else { raw };
            Utc.timestamp_millis_opt(millis as i64)
                .single()
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn normalize(record: Value) -> Token {
        Normalizer::new().normalize(&record, fixed_now())
    }

    #[test]
    fn test_listing_record_direct_fields() {
        let token = normalize(json!({
            "tokenAddress": "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr",
            "name": "Popcat",
            "symbol": "POPCAT",
            "logo": "https://ipfs.io/ipfs/popcat.png",
            "fullyDilutedValuation": "1250000.5",
            "priceUsd": "0.00125",
            "liquidity": "35000",
            "createdAt": "2024-05-30T10:00:00.000Z",
            "description": "pop pop"
        }));

        assert_eq!(token.identifier, "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr");
        assert_eq!(token.name, "Popcat");
        assert_eq!(token.symbol, "POPCAT");
        assert_eq!(token.image, "https://ipfs.io/ipfs/popcat.png");
        assert_relative_eq!(token.market_value, 1_250_000.5);
        assert_relative_eq!(token.price_usd, 0.00125);
        assert_relative_eq!(token.liquidity, 35_000.0);
        assert_eq!(token.created_at, "2024-05-30T10:00:00.000Z");
        assert_eq!(token.description, "pop pop");
        assert_eq!(token.creator_display, "7GCi…W2hr");
        assert_eq!(token.avatar, PLACEHOLDER_IMAGE);
        assert!(!token.nsfw);
        assert_eq!(token.comment_count, 0);
    }

    #[test]
    fn test_identifier_resolution_order() {
        let token = normalize(json!({ "mint": "MintAddr", "address": "Other" }));
        assert_eq!(token.identifier, "MintAddr");

        let token = normalize(json!({ "tokenAddress": "", "mint": "MintAddr" }));
        assert_eq!(token.identifier, "MintAddr");

        let token = normalize(json!({ "baseToken": { "address": "BaseAddr" } }));
        assert_eq!(token.identifier, "BaseAddr");

        let token = normalize(json!({ "name": "no address" }));
        assert_eq!(token.identifier, "");
    }

    #[test]
    fn test_nested_base_token_fallbacks() {
        let token = normalize(json!({
            "address": "So1anaPairAddress",
            "baseToken": {
                "name": "Nested Name",
                "symbol": "NEST",
                "tokenImageUrl": "https://cdn.example.com/nest.png"
            }
        }));

        assert_eq!(token.name, "Nested Name");
        assert_eq!(token.symbol, "NEST");
        assert_eq!(token.image, "https://cdn.example.com/nest.png");
        assert_eq!(token.description, "Nested Name");
    }

    #[test]
    fn test_direct_field_beats_nested() {
        let token = normalize(json!({
            "mint": "abc",
            "name": "Direct",
            "baseToken": { "name": "Nested" }
        }));
        assert_eq!(token.name, "Direct");
        // description falls back to the nested name, not the direct one
        assert_eq!(token.description, "Nested");
    }

    #[test]
    fn test_computed_fallbacks() {
        let token = normalize(json!({ "mint": "abcdefghijk" }));
        assert_eq!(token.name, "Unknown");
        assert_eq!(token.symbol, "ABCDEF");
        assert_eq!(token.image, PLACEHOLDER_IMAGE);
        assert_eq!(token.description, DEFAULT_DESCRIPTION);
        assert_eq!(token.created_at, "2024-06-01T12:00:00.000Z");

        let token = normalize(json!({}));
        assert_eq!(token.symbol, "TKN");
        assert_eq!(token.creator_display, "—");
    }

    #[test]
    fn test_numeric_fallbacks() {
        let token = normalize(json!({ "mint": "m", "marketCap": 5000, "price": 2.5, "volume": "880" }));
        assert_relative_eq!(token.market_value, 5000.0);
        assert_relative_eq!(token.price_usd, 2.5);
        assert_relative_eq!(token.liquidity, 880.0);

        // zero FDV is absent, so market cap is used
        let token = normalize(json!({ "mint": "m", "fullyDilutedValuation": 0, "marketCap": 10 }));
        assert_relative_eq!(token.market_value, 10.0);
    }

    #[test]
    fn test_non_numeric_coerces_to_zero() {
        let token = normalize(json!({
            "mint": "m",
            "fullyDilutedValuation": "not-a-number",
            "marketCap": 99,
            "priceUsd": { "value": 1 },
            "liquidity": "-50"
        }));
        assert_eq!(token.market_value, 0.0);
        assert_eq!(token.price_usd, 0.0);
        assert_eq!(token.liquidity, 0.0);
    }

    #[test]
    fn test_graduated_at_and_epoch_timestamps() {
        let token = normalize(json!({ "mint": "m", "graduatedAt": "2024-02-02T00:00:00Z" }));
        assert_eq!(token.created_at, "2024-02-02T00:00:00Z");

        let token = normalize(json!({ "mint": "m", "createdAt": 1_700_000_000 }));
        assert_eq!(token.created_at, "2023-11-14T22:13:20.000Z");

        let token = normalize(json!({ "mint": "m", "createdAt": 1_700_000_000_000i64 }));
        assert_eq!(token.created_at, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_broken_image_urls_use_placeholder() {
        let token = normalize(json!({ "mint": "m", "logo": "https://ipfs.io/ipfs/null" }));
        assert_eq!(token.image, PLACEHOLDER_IMAGE);

        let token = normalize(json!({ "mint": "m", "logo": "undefined" }));
        assert_eq!(token.image, PLACEHOLDER_IMAGE);

        assert_eq!(sanitize_image_url(Some("")), PLACEHOLDER_IMAGE);
        assert_eq!(sanitize_image_url(Some("https://a/b.png")), "https://a/b.png");
    }

    #[test]
    fn test_custom_rules() {
        let rules = NormalizerRules {
            identifier: FieldRule::new("identifier", &[&["contract", "id"]]),
            ..NormalizerRules::default()
        };
        let normalizer = Normalizer::with_rules(rules);
        let token = normalizer.normalize(&json!({ "contract": { "id": "XYZ" } }), fixed_now());
        assert_eq!(token.identifier, "XYZ");
        assert_eq!(normalizer.rules().identifier.paths.len(), 1);
    }

    #[test]
    fn test_rule_display_names_field_and_paths() {
        assert_eq!(SYMBOL_RULE.to_string(), "symbol <- symbol | baseToken.symbol");
        assert_eq!(
            IDENTIFIER_RULE.to_string(),
            "identifier <- tokenAddress | mint | address | baseToken.address"
        );
    }

    #[test]
    fn test_is_present_truthiness() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(0.0)));
        assert!(!is_present(&json!("")));
        assert!(is_present(&json!("0")));
        assert!(is_present(&json!(5)));
        assert!(is_present(&json!([])));
    }
}
