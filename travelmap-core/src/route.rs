//! Named travel routes.
//!
//! A route is a line through at least two positions. It serializes as a
//! GeoJSON `LineString` geometry so hosts can hand it straight to a map.

use geo::{Coord, LineString};

use crate::RouteError;

/// A single named path.
///
/// # Examples
/// ```
/// use geo::{Coord, LineString};
/// use travelmap_core::Route;
///
/// # fn main() -> Result<(), travelmap_core::RouteError> {
/// let line = LineString::from(vec![(135.76, 35.0), (135.77, 34.97)]);
/// let route = Route::new("kansai-loop", "Kansai loop", line)?;
/// assert_eq!(route.geometry.0.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawRoute")
)]
pub struct Route {
    /// Unique identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Ordered positions, `x = longitude`, `y = latitude`.
    #[cfg_attr(feature = "serde", serde(with = "line_geometry"))]
    pub geometry: LineString<f64>,
}

impl Route {
    /// Validate and construct a [`Route`].
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        geometry: LineString<f64>,
    ) -> Result<Self, RouteError> {
        let id = id.into();
        let title = title.into();
        if id.is_empty() {
            return Err(RouteError::EmptyId);
        }
        if title.is_empty() {
            return Err(RouteError::EmptyTitle);
        }
        let found = geometry.0.len();
        if found < 2 {
            return Err(RouteError::TooFewPositions { found });
        }
        if let Some(index) = geometry
            .0
            .iter()
            .position(|coord: &Coord<f64>| !(coord.x.is_finite() && coord.y.is_finite()))
        {
            return Err(RouteError::NonFinitePosition { index });
        }
        Ok(Self {
            id,
            title,
            geometry,
        })
    }
}

/// Wire form of a [`Route`]; decoding goes through [`Route::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRoute {
    id: String,
    title: String,
    #[serde(with = "line_geometry")]
    geometry: LineString<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRoute> for Route {
    type Error = RouteError;

    fn try_from(raw: RawRoute) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.title, raw.geometry)
    }
}

/// Serialize a line as `{"type": "LineString", "coordinates": [[lon, lat], ...]}`.
#[cfg(feature = "serde")]
mod line_geometry {
    use geo::{Coord, LineString};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    const LINE_STRING: &str = "LineString";

    #[derive(Serialize)]
    struct GeometryRef {
        #[serde(rename = "type")]
        kind: &'static str,
        coordinates: Vec<[f64; 2]>,
    }

    #[derive(Deserialize)]
    struct GeometryOwned {
        #[serde(rename = "type")]
        kind: String,
        coordinates: Vec<[f64; 2]>,
    }

    pub(super) fn serialize<S>(line: &LineString<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        GeometryRef {
            kind: LINE_STRING,
            coordinates: line.0.iter().map(|coord| [coord.x, coord.y]).collect(),
        }
        .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<LineString<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let geometry = GeometryOwned::deserialize(deserializer)?;
        if geometry.kind != LINE_STRING {
            return Err(D::Error::custom(format!(
                "expected LineString geometry, found {}",
                geometry.kind
            )));
        }
        Ok(LineString::new(
            geometry
                .coordinates
                .into_iter()
                .map(|[x, y]| Coord { x, y })
                .collect(),
        ))
    }
}
