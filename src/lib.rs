//! Facade crate for the travel map.
//!
//! This crate re-exports the core domain types and exposes the content
//! pipeline and map engine behind feature flags.

#![forbid(unsafe_code)]

pub use travelmap_core::{
    GeometryConstraint, HighlightSet, Photo, Place, PlaceError, PlaceSummary, PlaceWithHtml, Route,
    RouteError, RouteRefPolicy, UnresolvedRouteRef, ValidationError, check_route_refs,
    find_by_id, find_by_slug, highlight_set,
};

#[cfg(feature = "content")]
pub use travelmap_content::{
    ContentError, Corpus, LoadedCorpus, MarkupPipeline, endpoint, load_places, load_routes,
};

#[cfg(feature = "map")]
pub use travelmap_map::{
    ClusterIndex, ClusterOptions, EngineConfig, EngineError, EngineState, MapEngine, MapEvent,
    MapSurface, PendingExpansion, ResolvedStyle, SurfaceError, resolve_style,
};
