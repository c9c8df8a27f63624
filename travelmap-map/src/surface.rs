//! The rendering surface the engine drives.
//!
//! Implement [`MapSurface`] over a concrete map renderer. The engine only
//! issues the calls below and never inspects renderer state beyond
//! [`MapSurface::is_attached`] and [`MapSurface::has_layer`].

use geo::Coord;
use thiserror::Error;

use crate::{InitialView, LayerSpec, ResolvedStyle, SourceSpec, Visibility};

/// Mouse cursor shown over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// The renderer's default cursor.
    #[default]
    Default,
    /// Pointer shown over clickable features.
    Pointer,
}

/// Pointer interactions the engine listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointerEvent {
    /// A click on a feature.
    Click,
    /// The pointer moved onto a feature.
    Enter,
    /// The pointer moved off a feature.
    Leave,
}

/// Errors raised by a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface has no attached container.
    #[error("rendering surface is not attached")]
    Detached,
    /// The renderer refused an operation.
    #[error("renderer rejected {operation} for '{id}': {reason}")]
    Rejected {
        /// Operation that failed.
        operation: &'static str,
        /// Source or layer identifier involved.
        id: String,
        /// Renderer-supplied description.
        reason: String,
    },
}

/// Operations the engine performs on a map renderer.
pub trait MapSurface {
    /// Return `true` when a container is available to render into.
    fn is_attached(&self) -> bool;

    /// Create the base map with the given style and camera.
    ///
    /// The renderer reports completion later through
    /// [`crate::MapEvent::Loaded`].
    fn create_map(&mut self, style: &ResolvedStyle, view: InitialView)
    -> Result<(), SurfaceError>;

    /// Add a data source.
    fn add_source(&mut self, id: &str, source: &SourceSpec) -> Result<(), SurfaceError>;

    /// Add a layer on top of the existing ones.
    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), SurfaceError>;

    /// Return `true` when a layer with this identifier exists.
    fn has_layer(&self, id: &str) -> bool;

    /// Change only the visibility of an existing layer.
    fn set_visibility(&mut self, layer_id: &str, visibility: Visibility)
    -> Result<(), SurfaceError>;

    /// Subscribe to pointer events on a layer.
    fn listen(&mut self, layer_id: &str, event: PointerEvent) -> Result<(), SurfaceError>;

    /// Animate the camera.
    fn ease_to(&mut self, center: Coord<f64>, zoom: f64);

    /// Change the cursor.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Release the map, detaching every source, layer and listener.
    fn remove(&mut self);
}
