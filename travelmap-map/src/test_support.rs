//! In-memory [`MapSurface`] for tests.

use std::collections::{BTreeMap, BTreeSet};

use geo::Coord;

use crate::{
    Cursor, InitialView, LayerSpec, MapSurface, PointerEvent, ResolvedStyle, SourceSpec,
    SurfaceError, Visibility,
};

/// A call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    /// [`MapSurface::create_map`].
    CreateMap {
        /// Whether the hosted style was used.
        hosted: bool,
        /// Style zoom ceiling.
        max_zoom: u8,
        /// Starting camera.
        view: InitialView,
    },
    /// [`MapSurface::add_source`].
    AddSource(String),
    /// [`MapSurface::add_layer`].
    AddLayer(String),
    /// [`MapSurface::set_visibility`].
    SetVisibility(String, Visibility),
    /// [`MapSurface::listen`].
    Listen(String, PointerEvent),
    /// [`MapSurface::ease_to`].
    EaseTo {
        /// Camera target.
        center: Coord<f64>,
        /// Target zoom.
        zoom: f64,
    },
    /// [`MapSurface::set_cursor`].
    SetCursor(Cursor),
    /// [`MapSurface::remove`].
    Remove,
}

/// Records every call and mirrors the renderer's source and layer state.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    attached: bool,
    created: bool,
    calls: Vec<SurfaceCall>,
    sources: BTreeSet<String>,
    layers: BTreeMap<String, Visibility>,
    listeners: BTreeSet<(String, PointerEvent)>,
    cursor: Cursor,
    reject_layer: Option<String>,
}

impl RecordingSurface {
    /// A surface with a container to render into.
    #[must_use]
    pub fn attached() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    /// A surface without a container.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Refuse the next attempt to add layer `id`, as a renderer would on a
    /// bad paint property.
    #[must_use]
    pub fn rejecting_layer(mut self, id: impl Into<String>) -> Self {
        self.reject_layer = Some(id.into());
        self
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Forget recorded calls, keeping the mirrored state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Whether a base map currently exists.
    #[must_use]
    pub const fn has_map(&self) -> bool {
        self.created
    }

    /// Visibility of a layer, if it exists.
    #[must_use]
    pub fn visibility(&self, layer_id: &str) -> Option<Visibility> {
        self.layers.get(layer_id).copied()
    }

    /// Identifiers of every visible layer, sorted.
    #[must_use]
    pub fn visible_layers(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter(|(_, visibility)| **visibility == Visibility::Visible)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Number of sources on the map.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of layers on the map.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current cursor.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Camera moves issued so far.
    #[must_use]
    pub fn eases(&self) -> Vec<(Coord<f64>, f64)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::EaseTo { center, zoom } => Some((*center, *zoom)),
                _ => None,
            })
            .collect()
    }

    fn ensure_map(&self, operation: &'static str, id: &str) -> Result<(), SurfaceError> {
        if self.created {
            Ok(())
        } else {
            Err(rejected(operation, id, "no map"))
        }
    }
}

fn rejected(operation: &'static str, id: &str, reason: &str) -> SurfaceError {
    SurfaceError::Rejected {
        operation,
        id: id.to_owned(),
        reason: reason.to_owned(),
    }
}

impl MapSurface for RecordingSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn create_map(
        &mut self,
        style: &ResolvedStyle,
        view: InitialView,
    ) -> Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::Detached);
        }
        self.created = true;
        self.calls.push(SurfaceCall::CreateMap {
            hosted: style.is_hosted(),
            max_zoom: style.max_zoom,
            view,
        });
        Ok(())
    }

    fn add_source(&mut self, id: &str, _source: &SourceSpec) -> Result<(), SurfaceError> {
        self.ensure_map("add_source", id)?;
        if !self.sources.insert(id.to_owned()) {
            return Err(rejected("add_source", id, "source already exists"));
        }
        self.calls.push(SurfaceCall::AddSource(id.to_owned()));
        Ok(())
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), SurfaceError> {
        self.ensure_map("add_layer", &layer.id)?;
        if !self.sources.contains(&layer.source) {
            return Err(rejected("add_layer", &layer.id, "unknown source"));
        }
        if self.layers.contains_key(&layer.id) {
            return Err(rejected("add_layer", &layer.id, "layer already exists"));
        }
        if self.reject_layer.as_deref() == Some(layer.id.as_str()) {
            self.reject_layer = None;
            return Err(rejected("add_layer", &layer.id, "invalid paint property"));
        }
        self.layers.insert(layer.id.clone(), layer.visibility());
        self.calls.push(SurfaceCall::AddLayer(layer.id.clone()));
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn set_visibility(
        &mut self,
        layer_id: &str,
        visibility: Visibility,
    ) -> Result<(), SurfaceError> {
        let Some(current) = self.layers.get_mut(layer_id) else {
            return Err(rejected("set_visibility", layer_id, "unknown layer"));
        };
        *current = visibility;
        self.calls.push(SurfaceCall::SetVisibility(layer_id.to_owned(), visibility));
        Ok(())
    }

    fn listen(&mut self, layer_id: &str, event: PointerEvent) -> Result<(), SurfaceError> {
        if !self.layers.contains_key(layer_id) {
            return Err(rejected("listen", layer_id, "unknown layer"));
        }
        self.listeners.insert((layer_id.to_owned(), event));
        self.calls.push(SurfaceCall::Listen(layer_id.to_owned(), event));
        Ok(())
    }

    fn ease_to(&mut self, center: Coord<f64>, zoom: f64) {
        self.calls.push(SurfaceCall::EaseTo { center, zoom });
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.calls.push(SurfaceCall::SetCursor(cursor));
    }

    fn remove(&mut self) {
        self.created = false;
        self.sources.clear();
        self.layers.clear();
        self.listeners.clear();
        self.cursor = Cursor::Default;
        self.calls.push(SurfaceCall::Remove);
    }
}
