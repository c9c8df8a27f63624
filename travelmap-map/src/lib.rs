//! Map engine for the travel map.
//!
//! The engine turns a place list, a set of routes and a highlight set into
//! calls on a [`MapSurface`]: a clustered point source with three layers,
//! one hidden-by-default line layer per route, pointer listeners and camera
//! moves. Renderer events come back through [`MapEngine::handle`].
//!
//! ## Invariants
//! - Style resolution happens once per initialisation.
//! - Highlight changes only toggle the visibility of existing route layers.
//! - A selection callback fires at most once per point click.
//! - Expansions issued before a teardown never move the camera afterwards.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cluster;
mod engine;
mod layers;
mod style;
mod surface;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use cluster::{
    ClusterError, ClusterFeature, ClusterId, ClusterIndex, ClusterOptions, DEFAULT_EXTENT,
    DEFAULT_MAX_ZOOM, DEFAULT_MIN_POINTS, DEFAULT_RADIUS, ZOOM_LIMIT, abbreviate_count,
};
pub use engine::{
    EngineConfig, EngineError, EngineState, FALLBACK_EXPANSION_ZOOM, InteractiveLayer, MapEngine,
    MapEvent, PendingExpansion,
};
pub use layers::{
    CLUSTER_COUNT_LAYER, CLUSTER_RADIUS, CLUSTERS_LAYER, LayerKind, LayerSpec, PLACES_SOURCE,
    SourceSpec, UNCLUSTERED_LAYER, Visibility, place_layers, places_source, route_layer,
    route_layer_id, route_source, route_source_id,
};
pub use style::{
    FALLBACK_MAX_ZOOM, HOSTED_MAX_ZOOM, INITIAL_CENTER, INITIAL_ZOOM_CEILING, InitialView,
    MapStyle, ResolvedStyle, resolve_style,
};
pub use surface::{Cursor, MapSurface, PointerEvent, SurfaceError};
