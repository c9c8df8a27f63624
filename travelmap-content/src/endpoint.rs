//! Host-facing query responses.
//!
//! These wrap the loaders for an HTTP handler: success serializes the
//! collection, and any failure is logged in full but reported to the client
//! as a generic service-unavailable body with no file paths.

use log::error;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{ContentError, Corpus};

/// Status returned with a loaded collection.
pub const STATUS_OK: u16 = 200;
/// Status returned when the corpus failed to load.
pub const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// A status code and JSON body ready for an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON response body.
    pub body: Value,
}

impl QueryResponse {
    /// Return `true` for a successful response.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Respond to "list all places".
#[must_use]
pub fn places_response(corpus: &Corpus) -> QueryResponse {
    respond("places", corpus.load_places())
}

/// Respond to "list all routes".
#[must_use]
pub fn routes_response(corpus: &Corpus) -> QueryResponse {
    respond("routes", corpus.load_routes())
}

fn respond<T: Serialize>(collection: &str, loaded: Result<Vec<T>, ContentError>) -> QueryResponse {
    let encoded = match loaded {
        Ok(items) => serde_json::to_value(items),
        Err(err) => return unavailable(collection, &err),
    };
    match encoded {
        Ok(body) => QueryResponse {
            status: STATUS_OK,
            body,
        },
        Err(err) => unavailable(collection, &err),
    }
}

fn unavailable(collection: &str, cause: &dyn std::error::Error) -> QueryResponse {
    error!("failed to load {collection}: {cause}");
    QueryResponse {
        status: STATUS_SERVICE_UNAVAILABLE,
        body: json!({ "error": format!("Failed to load {collection}") }),
    }
}
