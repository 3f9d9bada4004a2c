use chrono::{Datelike, NaiveDate};

use crate::error::ResolutionError;

const EVENT_URL_MARKER: &str = "polymarket.com/event/";

/// Public page for an event, the form the resolver is normally handed.
pub fn event_url(slug: &str) -> String {
    format!("https://{EVENT_URL_MARKER}{slug}")
}

/// Render a slug template for `date`.
/// `{month}` → lower-case English month name, `{day}` → unpadded day of month.
/// `ethereum-up-or-down-on-{month}-{day}` on 2025-07-19 → `ethereum-up-or-down-on-july-19`.
pub fn render_slug(template: &str, date: NaiveDate) -> String {
    let month = date.format("%B").to_string().to_lowercase();
    template
        .replace("{month}", &month)
        .replace("{day}", &date.day().to_string())
}

/// Pull the event slug out of an event URL, or accept a bare slug as-is.
///
/// In a URL the slug runs from after `/event/` to the first `/`, `?`, `&` or `#`.
pub fn event_slug(reference: &str) -> Result<String, ResolutionError> {
    let reference = reference.trim();

    if let Some(idx) = reference.find(EVENT_URL_MARKER) {
        let rest = &reference[idx + EVENT_URL_MARKER.len()..];
        let end = rest.find(['/', '?', '&', '#']).unwrap_or(rest.len());
        let slug = &rest[..end];
        if slug.is_empty() {
            return Err(ResolutionError::NotFound(format!(
                "no event slug in '{reference}'"
            )));
        }
        return Ok(slug.to_string());
    }

    let is_bare_slug = !reference.is_empty()
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_bare_slug {
        Ok(reference.to_string())
    } else {
        Err(ResolutionError::NotFound(format!(
            "'{reference}' is not an event URL or slug"
        )))
    }
}
