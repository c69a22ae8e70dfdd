//! Member listing -> detail URLs.

use serde_json::Value;
use std::collections::HashMap;

use crate::fetch::{FetchError, JsonSource};

/// Key holding the member identifier in each listing entry.
pub const IDENT_KEY: &str = "ident";

/// The listing could not be turned into detail URLs. Aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("listing request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("listing response is not an array (got {0})")]
    NotAnArray(&'static str),
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Member identifiers in listing order. Entries without a usable `ident`
/// (missing, null, or not an object at all) are skipped. Any string ident is
/// kept as is, including the empty string.
pub fn identifiers(listing: &Value) -> Result<Vec<String>, ListingError> {
    let entries = listing
        .as_array()
        .ok_or_else(|| ListingError::NotAnArray(json_type(listing)))?;
    let mut ids = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        let ident = match entry.get(IDENT_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };
        ids.push(ident);
    }
    if skipped > 0 {
        tracing::debug!(skipped, "listing entries without ident");
    }
    Ok(ids)
}

/// Detail URL for one member: plain concatenation of prefix and identifier.
pub fn detail_url(prefix: &str, ident: &str) -> String {
    format!("{}{}", prefix, ident)
}

/// Fetch the listing once and build one detail URL per member, in listing order.
pub fn list_detail_urls<S: JsonSource + ?Sized>(
    source: &S,
    listing_url: &str,
    detail_prefix: &str,
    headers: &HashMap<String, String>,
) -> Result<Vec<String>, ListingError> {
    let listing = source.fetch_json(listing_url, headers)?;
    let urls: Vec<String> = identifiers(&listing)?
        .iter()
        .map(|id| detail_url(detail_prefix, id))
        .collect();
    tracing::info!(count = urls.len(), "listing fetched from {}", listing_url);
    Ok(urls)
}
