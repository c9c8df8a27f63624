//! Sources and layers drawn on the base map.
//!
//! Places share one clustered point source rendered three ways: cluster
//! circles, cluster count labels and unclustered points. Every route gets
//! its own line source and layer so its visibility can be toggled alone.

use serde::Serialize;
use serde_json::{Value, json};
use travelmap_core::{HighlightSet, PlaceSummary, Route};

/// Clustered point source holding every place.
pub const PLACES_SOURCE: &str = "places";
/// Circle layer for clusters.
pub const CLUSTERS_LAYER: &str = "clusters";
/// Label layer showing abbreviated cluster counts.
pub const CLUSTER_COUNT_LAYER: &str = "cluster-count";
/// Circle layer for standalone places.
pub const UNCLUSTERED_LAYER: &str = "unclustered";
/// Cluster radius handed to the renderer, in pixels.
pub const CLUSTER_RADIUS: u32 = 50;

const CLUSTER_COLOR: &str = "#3b82f6";
const POINT_COLOR: &str = "#1d4ed8";
const STROKE_COLOR: &str = "#fff";
const LABEL_COLOR: &str = "#ffffff";
const ROUTE_COLOR: &str = "#ef4444";

/// Source identifier for a route.
#[must_use]
pub fn route_source_id(route_id: &str) -> String {
    format!("route-src-{route_id}")
}

/// Layer identifier for a route.
#[must_use]
pub fn route_layer_id(route_id: &str) -> String {
    format!("route-lyr-{route_id}")
}

/// Layout visibility of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Drawn.
    Visible,
    /// Hidden.
    None,
}

impl Visibility {
    /// Visibility of a route layer under a highlight set.
    #[must_use]
    pub fn for_route(route_id: &str, highlighted: &HighlightSet) -> Self {
        if highlighted.contains(route_id) {
            Self::Visible
        } else {
            Self::None
        }
    }
}

/// Rendering kind of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Filled circles.
    Circle,
    /// Text labels.
    Symbol,
    /// Stroked lines.
    Line,
}

/// A data source added to the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "geojson", rename_all = "camelCase")]
pub struct SourceSpec {
    /// GeoJSON payload.
    pub data: Value,
    /// Whether the renderer clusters the points.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cluster: bool,
    /// Cluster radius in pixels, for clustered sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_radius: Option<u32>,
}

/// A layer added to the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSpec {
    /// Layer identifier.
    pub id: String,
    /// Rendering kind.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Source the layer draws from.
    pub source: String,
    /// Feature filter expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Layout properties.
    pub layout: Value,
    /// Paint properties.
    pub paint: Value,
}

impl LayerSpec {
    /// Initial visibility recorded in the layout, defaulting to visible.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        match self.layout.get("visibility").and_then(Value::as_str) {
            Some("none") => Visibility::None,
            _ => Visibility::Visible,
        }
    }
}

/// The clustered point source for the place list.
#[must_use]
pub fn places_source(places: &[PlaceSummary]) -> SourceSpec {
    let features: Vec<Value> = places
        .iter()
        .map(|place| {
            json!({
                "type": "Feature",
                "properties": { "id": place.id, "title": place.title },
                "geometry": { "type": "Point", "coordinates": [place.coords.x, place.coords.y] },
            })
        })
        .collect();
    SourceSpec {
        data: json!({ "type": "FeatureCollection", "features": features }),
        cluster: true,
        cluster_radius: Some(CLUSTER_RADIUS),
    }
}

/// The three layers drawn from [`PLACES_SOURCE`], bottom to top.
#[must_use]
pub fn place_layers() -> [LayerSpec; 3] {
    let has_count = json!(["has", "point_count"]);
    [
        LayerSpec {
            id: CLUSTERS_LAYER.to_owned(),
            kind: LayerKind::Circle,
            source: PLACES_SOURCE.to_owned(),
            filter: Some(has_count.clone()),
            layout: json!({}),
            paint: json!({
                "circle-radius": 16,
                "circle-color": CLUSTER_COLOR,
                "circle-stroke-width": 2,
                "circle-stroke-color": STROKE_COLOR,
            }),
        },
        LayerSpec {
            id: CLUSTER_COUNT_LAYER.to_owned(),
            kind: LayerKind::Symbol,
            source: PLACES_SOURCE.to_owned(),
            filter: Some(has_count.clone()),
            layout: json!({
                "text-field": ["get", "point_count_abbreviated"],
                "text-size": 12,
            }),
            paint: json!({ "text-color": LABEL_COLOR }),
        },
        LayerSpec {
            id: UNCLUSTERED_LAYER.to_owned(),
            kind: LayerKind::Circle,
            source: PLACES_SOURCE.to_owned(),
            filter: Some(json!(["!", has_count])),
            layout: json!({}),
            paint: json!({
                "circle-radius": 8,
                "circle-color": POINT_COLOR,
                "circle-stroke-width": 2,
                "circle-stroke-color": STROKE_COLOR,
            }),
        },
    ]
}

/// The line source for one route.
#[must_use]
pub fn route_source(route: &Route) -> SourceSpec {
    let coordinates: Vec<[f64; 2]> = route
        .geometry
        .0
        .iter()
        .map(|coord| [coord.x, coord.y])
        .collect();
    SourceSpec {
        data: json!({
            "type": "Feature",
            "properties": { "id": route.id, "title": route.title },
            "geometry": { "type": "LineString", "coordinates": coordinates },
        }),
        cluster: false,
        cluster_radius: None,
    }
}

/// The line layer for one route.
#[must_use]
pub fn route_layer(route: &Route, visibility: Visibility) -> LayerSpec {
    LayerSpec {
        id: route_layer_id(&route.id),
        kind: LayerKind::Line,
        source: route_source_id(&route.id),
        filter: None,
        layout: json!({ "visibility": visibility }),
        paint: json!({ "line-width": 3, "line-color": ROUTE_COLOR }),
    }
}
