//! Locates today's market for an event and its two outcome token ids.
//!
//! The catalog is inconsistent across events: markets may or may not be
//! embedded in the event, token ids may sit under `tokens`, `outcomes`, or a
//! `clobTokenIds` field that is sometimes a JSON-encoded string. Resolution
//! walks every known shape instead of assuming one.

pub mod extract;
pub mod slug;

use serde_json::Value;
use tracing::debug;

use crate::error::{ResolutionError, Result};
use crate::types::ResolvedMarket;

pub use extract::extract_token_pair;
pub use slug::{event_slug, event_url, render_slug};

/// Read access to the market catalog. Responses are returned as raw JSON.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// `GET /events?slug=<slug>`: a list of zero or more events.
    async fn events_by_slug(&self, slug: &str) -> Result<Value>;

    /// `GET /markets?event_id=<id>&active=true`: a list of markets.
    async fn active_markets(&self, event_id: &str) -> Result<Value>;

    /// `GET /markets/<id>`: one full market payload.
    async fn market_detail(&self, market_id: &str) -> Result<Value>;
}

/// Resolve an event URL or bare slug to its first market and (YES, NO) tokens.
pub async fn resolve<C: Catalog>(catalog: &C, reference: &str) -> Result<ResolvedMarket> {
    let slug = event_slug(reference)?;

    let events = catalog.events_by_slug(&slug).await?;
    let events = events.as_array().ok_or_else(|| {
        ResolutionError::AmbiguousSchema(format!("events response for '{slug}' is not a list"))
    })?;
    let event = events
        .first()
        .ok_or_else(|| ResolutionError::NotFound(format!("no event for slug '{slug}'")))?;

    let markets = match event
        .get("markets")
        .and_then(Value::as_array)
        .filter(|m| !m.is_empty())
    {
        Some(embedded) => embedded.clone(),
        None => {
            let event_id = id_of(event).ok_or_else(|| {
                ResolutionError::AmbiguousSchema(format!("event '{slug}' has no id"))
            })?;
            debug!(slug = %slug, event_id = %event_id, "No embedded markets, fetching active markets");
            let fetched = catalog.active_markets(&event_id).await?;
            match fetched {
                Value::Array(list) => list,
                _ => {
                    return Err(ResolutionError::AmbiguousSchema(format!(
                        "markets response for event {event_id} is not a list"
                    ))
                    .into())
                }
            }
        }
    };

    let mut market = markets
        .into_iter()
        .next()
        .ok_or_else(|| ResolutionError::NotFound(format!("no markets for event '{slug}'")))?;

    if !is_present(market.get("tokens")) && !is_present(market.get("outcomes")) {
        let market_id = id_of(&market).ok_or_else(|| {
            ResolutionError::AmbiguousSchema(format!("first market of '{slug}' has no id"))
        })?;
        debug!(slug = %slug, market_id = %market_id, "Market payload is partial, fetching detail");
        market = catalog.market_detail(&market_id).await?;
    }

    let (tokens, strategy) = extract_token_pair(&market).ok_or_else(|| {
        ResolutionError::InsufficientTokens(format!("market for '{slug}' exposes no token pair"))
    })?;

    let market_id = id_of(&market)
        .or_else(|| market.get("conditionId").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();
    let question = market
        .get("question")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    debug!(
        slug = %slug,
        market_id = %market_id,
        strategy,
        yes_token = %tokens.yes,
        "Resolved market tokens"
    );

    Ok(ResolvedMarket {
        event_slug: slug,
        market_id,
        question,
        tokens,
        raw: market,
    })
}

/// Catalog ids arrive as strings or numbers depending on the endpoint.
fn id_of(v: &Value) -> Option<String> {
    match v.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A field counts as present when it holds something non-empty.
fn is_present(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeCatalog {
        events: HashMap<String, Value>,
        markets_by_event: HashMap<String, Value>,
        details: HashMap<String, Value>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeCatalog {
        fn with_event(slug: &str, events: Value) -> Self {
            let mut catalog = Self::default();
            catalog.events.insert(slug.to_string(), events);
            catalog
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Catalog for FakeCatalog {
        async fn events_by_slug(&self, slug: &str) -> Result<Value> {
            self.calls.borrow_mut().push(format!("events:{slug}"));
            Ok(self.events.get(slug).cloned().unwrap_or_else(|| json!([])))
        }

        async fn active_markets(&self, event_id: &str) -> Result<Value> {
            self.calls.borrow_mut().push(format!("markets:{event_id}"));
            Ok(self
                .markets_by_event
                .get(event_id)
                .cloned()
                .unwrap_or_else(|| json!([])))
        }

        async fn market_detail(&self, market_id: &str) -> Result<Value> {
            self.calls.borrow_mut().push(format!("detail:{market_id}"));
            self.details
                .get(market_id)
                .cloned()
                .ok_or_else(|| AppError::Upstream(format!("404 for market {market_id}")))
        }
    }

    const URL: &str = "https://polymarket.com/event/eth-up-or-down-on-july-19";
    const SLUG: &str = "eth-up-or-down-on-july-19";

    #[tokio::test]
    async fn embedded_market_with_tokens_needs_one_fetch() {
        let catalog = FakeCatalog::with_event(
            SLUG,
            json!([{
                "id": "ev1",
                "markets": [{
                    "id": "m1",
                    "question": "Ethereum Up or Down on July 19?",
                    "tokens": [{ "token_id": "yes-1" }, { "token_id": "no-1" }]
                }]
            }]),
        );

        let market = resolve(&catalog, URL).await.unwrap();
        assert_eq!(market.event_slug, SLUG);
        assert_eq!(market.market_id, "m1");
        assert_eq!(market.tokens.yes, "yes-1");
        assert_eq!(market.tokens.no, "no-1");
        assert_eq!(market.question, "Ethereum Up or Down on July 19?");
        assert_eq!(catalog.calls(), vec![format!("events:{SLUG}")]);
    }

    #[tokio::test]
    async fn missing_embedded_markets_triggers_scoped_fetch() {
        let mut catalog = FakeCatalog::with_event(SLUG, json!([{ "id": 4242, "markets": [] }]));
        catalog.markets_by_event.insert(
            "4242".to_string(),
            json!([{
                "id": "m7",
                "outcomes": "[\"Up\", \"Down\"]",
                "clobTokenIds": "[\"111\", \"222\"]"
            }]),
        );

        let market = resolve(&catalog, SLUG).await.unwrap();
        assert_eq!(market.tokens.yes, "111");
        assert_eq!(market.tokens.no, "222");
        assert_eq!(
            catalog.calls(),
            vec![format!("events:{SLUG}"), "markets:4242".to_string()]
        );
    }

    #[tokio::test]
    async fn partial_market_is_completed_from_detail() {
        let mut catalog = FakeCatalog::with_event(
            SLUG,
            json!([{ "id": "ev1", "markets": [{ "id": "m9", "slug": SLUG }] }]),
        );
        catalog.details.insert(
            "m9".to_string(),
            json!({ "id": "m9", "clobTokenIds": ["y9", "n9"], "outcomes": "[\"Yes\",\"No\"]" }),
        );

        let market = resolve(&catalog, URL).await.unwrap();
        assert_eq!(market.tokens.yes, "y9");
        assert_eq!(market.raw["id"], "m9");
        assert_eq!(catalog.calls().last().map(String::as_str), Some("detail:m9"));
    }

    #[tokio::test]
    async fn empty_event_list_is_not_found() {
        let catalog = FakeCatalog::default();
        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(err, AppError::Resolution(ResolutionError::NotFound(_))));
    }

    #[tokio::test]
    async fn event_without_markets_is_not_found() {
        let catalog = FakeCatalog::with_event(SLUG, json!([{ "id": "ev1" }]));
        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(err, AppError::Resolution(ResolutionError::NotFound(_))));
        assert_eq!(catalog.calls().len(), 2);
    }

    #[tokio::test]
    async fn bad_reference_fails_before_any_fetch() {
        let catalog = FakeCatalog::default();
        let err = resolve(&catalog, "https://example.com/x y").await.unwrap_err();
        assert!(matches!(err, AppError::Resolution(ResolutionError::NotFound(_))));
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn market_without_two_ids_is_insufficient() {
        let catalog = FakeCatalog::with_event(
            SLUG,
            json!([{ "id": "ev1", "markets": [{ "id": "m1", "tokens": [{ "token_id": "solo" }] }] }]),
        );
        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Resolution(ResolutionError::InsufficientTokens(_))
        ));
    }

    #[tokio::test]
    async fn non_list_events_response_is_ambiguous() {
        let catalog = FakeCatalog::with_event(SLUG, json!({ "error": "rate limited" }));
        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Resolution(ResolutionError::AmbiguousSchema(_))
        ));
    }

    #[tokio::test]
    async fn non_list_markets_response_is_ambiguous() {
        let mut catalog = FakeCatalog::with_event(SLUG, json!([{ "id": "ev9" }]));
        catalog
            .markets_by_event
            .insert("ev9".to_string(), json!({ "data": [], "next_cursor": "LTE=" }));

        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Resolution(ResolutionError::AmbiguousSchema(_))
        ));
        assert_eq!(catalog.calls(), vec![format!("events:{SLUG}"), "markets:ev9".to_string()]);
    }

    #[tokio::test]
    async fn event_without_id_is_ambiguous() {
        let catalog = FakeCatalog::with_event(SLUG, json!([{ "slug": SLUG, "markets": [] }]));

        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Resolution(ResolutionError::AmbiguousSchema(_))
        ));
        assert_eq!(catalog.calls(), vec![format!("events:{SLUG}")]);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let catalog = FakeCatalog::with_event(
            SLUG,
            json!([{ "id": "ev1", "markets": [{ "id": "gone" }] }]),
        );
        let err = resolve(&catalog, URL).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
