use serde_json::Value;

use crate::types::TokenPair;

/// One way of reading two outcome token ids out of a market payload.
type Strategy = fn(&Value) -> Option<TokenPair>;

/// Tried in order; the first strategy that yields two usable ids wins.
/// New catalog shapes go at the end of this list.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("tokens", from_tokens),
    ("outcomes", from_outcomes),
    ("clobTokenIds:encoded", from_encoded_clob_ids),
    ("clobTokenIds:list", from_clob_id_list),
];

/// Extract the (YES, NO) token ids from a market payload.
/// Returns the pair together with the name of the strategy that matched.
pub fn extract_token_pair(market: &Value) -> Option<(TokenPair, &'static str)> {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(market).map(|pair| (pair, *name)))
}

/// `tokens: [{ "token_id": "..", "outcome": "Yes" }, ..]`
fn from_tokens(market: &Value) -> Option<TokenPair> {
    ids_from_entries(market.get("tokens")?)
}

/// `outcomes: [{ "token_id": ".." }, ..]`
fn from_outcomes(market: &Value) -> Option<TokenPair> {
    ids_from_entries(market.get("outcomes")?)
}

/// `clobTokenIds: "[\"123\", \"456\"]"`
fn from_encoded_clob_ids(market: &Value) -> Option<TokenPair> {
    let encoded = market.get("clobTokenIds")?.as_str()?;
    let decoded: Value = serde_json::from_str(encoded).ok()?;
    pair_from(decoded.as_array()?.iter().filter_map(token_id))
}

/// `clobTokenIds: ["123", "456"]`
fn from_clob_id_list(market: &Value) -> Option<TokenPair> {
    let ids = market.get("clobTokenIds")?.as_array()?;
    pair_from(ids.iter().filter_map(token_id))
}

fn ids_from_entries(list: &Value) -> Option<TokenPair> {
    let entries = list.as_array()?;
    if entries.len() < 2 {
        return None;
    }
    pair_from(
        entries
            .iter()
            .filter_map(|entry| entry.get("token_id"))
            .filter_map(token_id),
    )
}

/// First two ids in source order; the first is YES.
fn pair_from(mut ids: impl Iterator<Item = String>) -> Option<TokenPair> {
    let yes = ids.next()?;
    let no = ids.next()?;
    Some(TokenPair { yes, no })
}

/// Token ids are opaque. Some payloads carry them as bare numbers.
fn token_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
