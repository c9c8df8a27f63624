//! Base imagery style selection.
//!
//! With a tile-service credential the map uses the hosted satellite style
//! and can zoom to 18. Without one it falls back to a keyless public imagery
//! source capped at zoom 17. The choice is made once per initialisation.

use geo::Coord;
use serde::Serialize;
use serde_json::{Value, json};

/// Maximum zoom with the hosted style.
pub const HOSTED_MAX_ZOOM: u8 = 18;
/// Maximum zoom with the keyless fallback.
pub const FALLBACK_MAX_ZOOM: u8 = 17;
/// Zoom ceiling for the initial camera.
pub const INITIAL_ZOOM_CEILING: u8 = 5;
/// Initial camera centre: Tokyo Station, `[lon, lat]`.
pub const INITIAL_CENTER: Coord<f64> = Coord {
    x: 139.767,
    y: 35.681,
};

const HOSTED_STYLE_URL: &str = "https://api.maptiler.com/maps/satellite/style.json";
const FALLBACK_SOURCE: &str = "esri-satellite";
const FALLBACK_LAYER: &str = "esri-satellite-layer";
const FALLBACK_TILES: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const FALLBACK_ATTRIBUTION: &str =
    "© Esri, Maxar, Earthstar Geographics, and the GIS User Community";
const FALLBACK_TILE_SIZE: u16 = 256;
const FALLBACK_LAYER_MAX_ZOOM: u8 = 22;

/// Either a hosted style URL or an inline style document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MapStyle {
    /// Style fetched by the renderer from a URL.
    Hosted {
        /// Style document URL, including the credential.
        url: String,
    },
    /// Style document supplied directly.
    Inline {
        /// The style document.
        document: Value,
    },
}

/// The style chosen for one initialisation together with its zoom ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    /// Base imagery style.
    pub style: MapStyle,
    /// Highest zoom the imagery supports.
    pub max_zoom: u8,
}

/// Camera position when the map first appears.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InitialView {
    /// Centre as `x = longitude`, `y = latitude`.
    pub center: Coord<f64>,
    /// Starting zoom.
    pub zoom: u8,
}

impl ResolvedStyle {
    /// Starting camera: Tokyo Station at `min(5, max_zoom - 2)`.
    #[must_use]
    pub fn initial_view(&self) -> InitialView {
        InitialView {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM_CEILING.min(self.max_zoom.saturating_sub(2)),
        }
    }

    /// Return `true` when the hosted style was chosen.
    #[must_use]
    pub const fn is_hosted(&self) -> bool {
        matches!(self.style, MapStyle::Hosted { .. })
    }
}

/// Choose the base style for the optional credential.
///
/// Blank credentials count as absent.
///
/// # Examples
/// ```
/// use travelmap_map::{FALLBACK_MAX_ZOOM, HOSTED_MAX_ZOOM, resolve_style};
///
/// assert_eq!(resolve_style(Some("abc")).max_zoom, HOSTED_MAX_ZOOM);
/// assert_eq!(resolve_style(None).max_zoom, FALLBACK_MAX_ZOOM);
/// assert_eq!(resolve_style(Some("  ")).max_zoom, FALLBACK_MAX_ZOOM);
/// ```
#[must_use]
pub fn resolve_style(credential: Option<&str>) -> ResolvedStyle {
    match credential.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => ResolvedStyle {
            style: MapStyle::Hosted {
                url: format!("{HOSTED_STYLE_URL}?key={key}"),
            },
            max_zoom: HOSTED_MAX_ZOOM,
        },
        None => ResolvedStyle {
            style: MapStyle::Inline {
                document: fallback_document(),
            },
            max_zoom: FALLBACK_MAX_ZOOM,
        },
    }
}

fn fallback_document() -> Value {
    json!({
        "version": 8,
        "sources": {
            FALLBACK_SOURCE: {
                "type": "raster",
                "tiles": [FALLBACK_TILES],
                "tileSize": FALLBACK_TILE_SIZE,
                "attribution": FALLBACK_ATTRIBUTION,
                "maxzoom": FALLBACK_MAX_ZOOM,
            }
        },
        "layers": [{
            "id": FALLBACK_LAYER,
            "type": "raster",
            "source": FALLBACK_SOURCE,
            "minzoom": 0,
            "maxzoom": FALLBACK_LAYER_MAX_ZOOM,
        }],
    })
}
