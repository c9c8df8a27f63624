//! Content loading for the travel map.
//!
//! Responsibilities:
//! - Read place records (YAML metadata plus markdown body) and route records
//!   (GeoJSON line features) from a fixed directory layout.
//! - Validate every record and render place bodies to sanitized HTML.
//! - Wrap the loaders in host-facing query responses.
//!
//! Boundaries:
//! - Domain types and validation errors live in `travelmap-core`.
//! - Rendering and interaction live in `travelmap-map`.
//!
//! Invariants:
//! - Loads are fail-fast: one malformed record yields an error and no
//!   entities.
//! - A missing directory is an empty corpus, not an error.
//! - Places are ordered most recent first; ties keep file-name order.
//! - Every body passes through the sanitizer.
#![forbid(unsafe_code)]

mod corpus;
mod dates;
pub mod endpoint;
mod error;
mod frontmatter;
mod markup;
mod places;
mod routes;

pub use corpus::{Corpus, LoadedCorpus, PLACES_DIR, ROUTES_DIR};
pub use dates::parse_date;
pub use error::ContentError;
pub use markup::{MarkupError, MarkupPipeline, SanitizedHtml};
pub use places::{PLACE_EXTENSIONS, load_places, parse_place};
pub use routes::{ROUTE_EXTENSION, load_routes, parse_route};
