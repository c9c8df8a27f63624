//! Core domain types for the travel map.
//!
//! These models are shared by the content pipeline, which produces them from
//! source files, and the map engine, which renders them. Constructors return
//! `Result` so invalid records surface early instead of reaching a render.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod highlight;
mod place;
mod route;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{GeometryConstraint, PlaceError, RouteError, ValidationError};
pub use highlight::{
    HighlightSet, RouteRefPolicy, UnresolvedRouteRef, check_route_refs, highlight_set,
};
pub use place::{Photo, Place, PlaceSummary, PlaceWithHtml, find_by_id, find_by_slug};
pub use route::Route;
