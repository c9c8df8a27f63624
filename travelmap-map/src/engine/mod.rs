//! The map engine state machine.
//!
//! ```text
//! Uninitialized --mount--> StyleResolving --Loaded--> Ready --listeners--> Interactive
//!       ^                                                                      |
//!       +------------------------------ teardown ------------------------------+
//! ```
//!
//! The engine owns no business data. It projects the host's place list and
//! routes onto a [`MapSurface`], reports selections through a callback and
//! applies highlight sets as visibility toggles.

use std::fmt;

use geo::Coord;
use log::{debug, info, warn};
use thiserror::Error;
use travelmap_core::{HighlightSet, PlaceSummary, Route};

use crate::{
    CLUSTERS_LAYER, ClusterId, ClusterIndex, ClusterOptions, Cursor, MapSurface, PLACES_SOURCE,
    PointerEvent, ResolvedStyle, SurfaceError, UNCLUSTERED_LAYER, Visibility, place_layers,
    places_source, resolve_style, route_layer, route_layer_id, route_source, route_source_id,
};

/// Zoom used when a cluster expansion resolves without a level.
pub const FALLBACK_EXPANSION_ZOOM: u8 = 10;

/// Lifecycle of a [`MapEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not attached to a rendering surface.
    Uninitialized,
    /// Base map created; waiting for the renderer to finish loading.
    StyleResolving,
    /// Sources and layers added; listeners not yet registered.
    Ready,
    /// Accepting pointer interaction.
    Interactive,
}

/// Engine settings fixed at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    credential: Option<String>,
    cluster: ClusterOptions,
}

impl EngineConfig {
    /// Default settings: keyless imagery and default clustering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a tile-service credential for the hosted imagery style.
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Override the clustering options.
    #[must_use]
    pub const fn with_cluster_options(mut self, options: ClusterOptions) -> Self {
        self.cluster = options;
        self
    }

    /// Configured credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }
}

/// Layers that respond to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveLayer {
    /// Cluster circles.
    Clusters,
    /// Standalone place points.
    Unclustered,
}

impl InteractiveLayer {
    /// Every interactive layer.
    pub const ALL: [Self; 2] = [Self::Clusters, Self::Unclustered];

    /// Layer identifier on the surface.
    #[must_use]
    pub const fn layer_id(self) -> &'static str {
        match self {
            Self::Clusters => CLUSTERS_LAYER,
            Self::Unclustered => UNCLUSTERED_LAYER,
        }
    }
}

/// Renderer events forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The base map finished loading.
    Loaded,
    /// An unclustered point was clicked. `id` is the feature's `id`
    /// property, if it had one.
    PointClicked {
        /// Place identifier carried by the feature.
        id: Option<String>,
    },
    /// A cluster circle was clicked.
    ///
    /// The engine finds the cluster through its own index, so the
    /// renderer's cluster numbering never leaks in.
    ClusterClicked {
        /// Position of the clicked cluster circle.
        center: Coord<f64>,
        /// Integer zoom the map was at when clicked.
        zoom: u8,
    },
    /// The pointer entered an interactive layer.
    PointerEnter(InteractiveLayer),
    /// The pointer left an interactive layer.
    PointerLeave(InteractiveLayer),
}

/// A cluster expansion waiting for its zoom level.
///
/// Tickets are tied to the engine instance that issued them; completing one
/// after a teardown or rebuild has no effect.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct PendingExpansion {
    generation: u64,
    cluster: ClusterId,
    center: Coord<f64>,
}

impl PendingExpansion {
    /// Cluster being expanded.
    #[must_use]
    pub const fn cluster(&self) -> ClusterId {
        self.cluster
    }

    /// Where the camera will centre.
    #[must_use]
    pub const fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Engine generation that issued the ticket.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Errors raised while building the map.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The surface rejected an operation.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

type SelectionCallback = Box<dyn FnMut(&str)>;

/// Drives a [`MapSurface`] from host inputs and renderer events.
///
/// Call [`MapEngine::mount`] once a container exists, forward the
/// renderer's load event as [`MapEvent::Loaded`], then forward pointer
/// events. Highlight changes go through [`MapEngine::set_highlight`] and
/// new content through [`MapEngine::update_inputs`].
pub struct MapEngine<S: MapSurface> {
    surface: S,
    config: EngineConfig,
    state: EngineState,
    generation: u64,
    style: Option<ResolvedStyle>,
    index: Option<ClusterIndex>,
    places: Vec<PlaceSummary>,
    routes: Vec<Route>,
    highlight: HighlightSet,
    on_select: SelectionCallback,
}

impl<S: MapSurface + fmt::Debug> fmt::Debug for MapEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapEngine")
            .field("surface", &self.surface)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("places", &self.places.len())
            .field("routes", &self.routes.len())
            .field("highlight", &self.highlight)
            .finish_non_exhaustive()
    }
}

impl<S: MapSurface> MapEngine<S> {
    /// Create an unmounted engine.
    #[must_use]
    pub fn new(surface: S, config: EngineConfig, on_select: impl FnMut(&str) + 'static) -> Self {
        Self {
            surface,
            config,
            state: EngineState::Uninitialized,
            generation: 0,
            style: None,
            index: None,
            places: Vec::new(),
            routes: Vec::new(),
            highlight: HighlightSet::new(),
            on_select: Box::new(on_select),
        }
    }

    /// Set the initial place list and routes before mounting.
    #[must_use]
    pub fn with_inputs(mut self, places: Vec<PlaceSummary>, routes: Vec<Route>) -> Self {
        self.places = places;
        self.routes = routes;
        self
    }

    /// Set the initial highlight set before mounting.
    #[must_use]
    pub fn with_highlight(mut self, highlight: HighlightSet) -> Self {
        self.highlight = highlight;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Instance counter; bumps on every mount and teardown.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Style chosen for the current instance.
    #[must_use]
    pub const fn style(&self) -> Option<&ResolvedStyle> {
        self.style.as_ref()
    }

    /// Cluster index for the current instance, once loaded.
    #[must_use]
    pub const fn cluster_index(&self) -> Option<&ClusterIndex> {
        self.index.as_ref()
    }

    /// Current highlight set.
    #[must_use]
    pub const fn highlight(&self) -> &HighlightSet {
        &self.highlight
    }

    /// The rendering surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// The rendering surface, mutably.
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Attach to the surface and create the base map.
    ///
    /// Without an attached container this is a no-op. Mounting an already
    /// mounted engine does nothing.
    ///
    /// # Errors
    /// Returns [`EngineError::Surface`] when the renderer refuses to create
    /// the map; the engine stays uninitialised.
    pub fn mount(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Uninitialized {
            return Ok(());
        }
        if !self.surface.is_attached() {
            debug!("no rendering surface attached; skipping map initialisation");
            return Ok(());
        }
        self.generation = self.generation.wrapping_add(1);
        let style = resolve_style(self.config.credential());
        self.surface.create_map(&style, style.initial_view())?;
        debug!(
            "created base map (hosted style: {}, max zoom {})",
            style.is_hosted(),
            style.max_zoom
        );
        self.style = Some(style);
        self.state = EngineState::StyleResolving;
        Ok(())
    }

    /// Apply a renderer event.
    ///
    /// A cluster click yields a [`PendingExpansion`] for the host to resolve
    /// and pass to [`MapEngine::complete_expansion`]; clicks that hit no
    /// cluster in the engine's index yield nothing. Cluster clicks never
    /// select a place. Events that do not fit the current state are ignored.
    ///
    /// # Errors
    /// Returns [`EngineError::Surface`] when building layers on
    /// [`MapEvent::Loaded`] fails. The partial map is then released and the
    /// engine is back to [`EngineState::Uninitialized`], ready to mount
    /// again.
    pub fn handle(&mut self, event: MapEvent) -> Result<Option<PendingExpansion>, EngineError> {
        match (self.state, event) {
            (EngineState::StyleResolving, MapEvent::Loaded) => {
                self.build()?;
                Ok(None)
            }
            (EngineState::Interactive, MapEvent::PointClicked { id }) => {
                if let Some(selected) = id.filter(|value| !value.is_empty()) {
                    (self.on_select)(&selected);
                }
                Ok(None)
            }
            (EngineState::Interactive, MapEvent::ClusterClicked { center, zoom }) => {
                let hit = self
                    .index
                    .as_ref()
                    .and_then(|index| index.cluster_at(center, zoom));
                let Some(cluster) = hit else {
                    debug!("no cluster under {center:?} at zoom {zoom}");
                    return Ok(None);
                };
                Ok(Some(PendingExpansion {
                    generation: self.generation,
                    cluster,
                    center,
                }))
            }
            (EngineState::Interactive, MapEvent::PointerEnter(_)) => {
                self.surface.set_cursor(Cursor::Pointer);
                Ok(None)
            }
            (EngineState::Interactive, MapEvent::PointerLeave(_)) => {
                self.surface.set_cursor(Cursor::Default);
                Ok(None)
            }
            (state, ignored) => {
                debug!("ignoring {ignored:?} in state {state:?}");
                Ok(None)
            }
        }
    }

    /// Finish a cluster expansion with the renderer's answer.
    ///
    /// Stale tickets and failed lookups are dropped silently. Returns `true`
    /// when the camera moved.
    pub fn complete_expansion<E: fmt::Display>(
        &mut self,
        ticket: PendingExpansion,
        zoom: Result<Option<u8>, E>,
    ) -> bool {
        if ticket.generation != self.generation || self.state != EngineState::Interactive {
            debug!(
                "discarding expansion of cluster {} from generation {}",
                ticket.cluster, ticket.generation
            );
            return false;
        }
        match zoom {
            Ok(level) => {
                let target = level.unwrap_or(FALLBACK_EXPANSION_ZOOM);
                self.surface.ease_to(ticket.center, f64::from(target));
                true
            }
            Err(err) => {
                debug!("cluster {} expansion failed: {err}", ticket.cluster);
                false
            }
        }
    }

    /// Finish a cluster expansion using the engine's own cluster index.
    pub fn resolve_expansion(&mut self, ticket: PendingExpansion) -> bool {
        let Some(index) = self.index.as_ref() else {
            return false;
        };
        let zoom = index.expansion_zoom(ticket.cluster).map(Some);
        self.complete_expansion(ticket, zoom)
    }

    /// Show exactly the routes in `highlight`.
    ///
    /// Only the visibility of existing route layers changes; nothing is added
    /// or removed. Applying the same set twice is the same as applying it
    /// once. A layer the surface refuses to update keeps its old visibility.
    pub fn set_highlight(&mut self, highlight: HighlightSet) {
        self.highlight = highlight;
        for route in &self.routes {
            let layer_id = route_layer_id(&route.id);
            if !self.surface.has_layer(&layer_id) {
                continue;
            }
            let visibility = Visibility::for_route(&route.id, &self.highlight);
            if let Err(err) = self.surface.set_visibility(&layer_id, visibility) {
                debug!("could not update {layer_id}: {err}");
            }
        }
    }

    /// Replace the place list and routes.
    ///
    /// Unchanged inputs are a no-op. Otherwise a mounted engine is torn down
    /// and rebuilt from scratch.
    ///
    /// # Errors
    /// Returns [`EngineError::Surface`] when remounting fails.
    pub fn update_inputs(
        &mut self,
        places: Vec<PlaceSummary>,
        routes: Vec<Route>,
    ) -> Result<(), EngineError> {
        if places == self.places && routes == self.routes {
            return Ok(());
        }
        self.places = places;
        self.routes = routes;
        if self.state == EngineState::Uninitialized {
            return Ok(());
        }
        self.teardown();
        self.mount()
    }

    /// Release the surface. Pending expansions from this instance become
    /// stale.
    pub fn teardown(&mut self) {
        if self.state != EngineState::Uninitialized {
            self.surface.remove();
            debug!("released map instance {}", self.generation);
        }
        self.state = EngineState::Uninitialized;
        self.style = None;
        self.index = None;
        self.generation = self.generation.wrapping_add(1);
    }

    fn build(&mut self) -> Result<(), EngineError> {
        if let Err(err) = self.populate() {
            warn!("map build failed, releasing the partial map: {err}");
            self.teardown();
            return Err(err);
        }
        info!(
            "map ready with {} places and {} routes",
            self.places.len(),
            self.routes.len()
        );
        Ok(())
    }

    fn populate(&mut self) -> Result<(), EngineError> {
        let coords: Vec<Coord<f64>> = self.places.iter().map(|place| place.coords).collect();
        self.index = Some(ClusterIndex::new(&coords, self.config.cluster));

        self.surface.add_source(PLACES_SOURCE, &places_source(&self.places))?;
        for layer in place_layers() {
            self.surface.add_layer(&layer)?;
        }
        for route in &self.routes {
            self.surface.add_source(&route_source_id(&route.id), &route_source(route))?;
            let visibility = Visibility::for_route(&route.id, &self.highlight);
            self.surface.add_layer(&route_layer(route, visibility))?;
        }
        self.state = EngineState::Ready;

        for layer in InteractiveLayer::ALL {
            for event in [PointerEvent::Click, PointerEvent::Enter, PointerEvent::Leave] {
                self.surface.listen(layer.layer_id(), event)?;
            }
        }
        self.state = EngineState::Interactive;
        Ok(())
    }
}

#[cfg(test)]
mod behaviour;
