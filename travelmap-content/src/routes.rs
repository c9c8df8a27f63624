//! Loading route records.
//!
//! Each route file holds one GeoJSON `Feature` with `id` and `title`
//! properties and a `LineString` geometry.

use std::collections::HashMap;

use camino::Utf8Path;
use geo::{Coord, LineString};
use log::{debug, info};
use serde_json::Value;
use travelmap_core::{GeometryConstraint, Route, RouteError, ValidationError};

use crate::ContentError;

/// File extension recognised as a route record.
pub const ROUTE_EXTENSION: &str = "geojson";

/// Load every route file in `dir`.
///
/// Routes come back in file-name order; callers must not rely on any
/// particular order. A missing directory yields an empty collection.
///
/// # Errors
/// Returns the first [`ContentError`] encountered across the batch.
pub fn load_routes(dir: &Utf8Path) -> Result<Vec<Route>, ContentError> {
    let read_err = |source| ContentError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let Some(handle) = travelmap_fs::open_dir_if_exists(dir).map_err(read_err)? else {
        debug!("route directory {dir} is absent; loading no routes");
        return Ok(Vec::new());
    };
    let names =
        travelmap_fs::file_names_with_extension(&handle, ROUTE_EXTENSION).map_err(read_err)?;

    let routes = names
        .iter()
        .map(|name| {
            let source =
                travelmap_fs::read_to_string(&handle, name).map_err(|source| ContentError::Read {
                    path: dir.join(name),
                    source,
                })?;
            parse_route(name, &source)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (name, route) in names.iter().zip(&routes) {
        if let Some(first) = seen.insert(route.id.as_str(), name.as_str()) {
            return Err(ValidationError::DuplicateId {
                file: name.clone(),
                id: route.id.clone(),
                first: first.to_owned(),
            }
            .into());
        }
    }
    info!("loaded {} routes from {dir}", routes.len());
    Ok(routes)
}

/// Parse a single route file.
///
/// # Errors
/// Returns [`ContentError::RouteJson`] when the file is not JSON and
/// [`ContentError::Validation`] when it is not a usable line feature.
pub fn parse_route(file: &str, source: &str) -> Result<Route, ContentError> {
    let value: Value = serde_json::from_str(source).map_err(|source| ContentError::RouteJson {
        file: file.to_owned(),
        source,
    })?;
    let route = route_from_feature(file, &value)?;
    debug!("parsed route {} from {file}", route.id);
    Ok(route)
}

fn route_from_feature(file: &str, feature: &Value) -> Result<Route, ValidationError> {
    let malformed = |constraint| ValidationError::MalformedGeometry {
        file: file.to_owned(),
        constraint,
    };
    if feature.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err(malformed(GeometryConstraint::NotAFeature));
    }
    let id = property(file, feature, "id")?;
    let title = property(file, feature, "title")?;

    let geometry = feature.get("geometry");
    let kind = geometry
        .and_then(|geometry| geometry.get("type"))
        .and_then(Value::as_str);
    if kind != Some("LineString") {
        return Err(malformed(GeometryConstraint::NotALineString {
            found: kind.map(str::to_owned),
        }));
    }
    let positions = geometry
        .and_then(|geometry| geometry.get("coordinates"))
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(GeometryConstraint::CoordinatesNotArray))?;
    let coords = positions
        .iter()
        .enumerate()
        .map(|(index, position)| {
            position_to_coord(position)
                .ok_or_else(|| malformed(GeometryConstraint::InvalidPosition { index }))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Route::new(id, title, LineString::new(coords)).map_err(|err| match err {
        RouteError::EmptyId => missing(file, "id"),
        RouteError::EmptyTitle => missing(file, "title"),
        other => other
            .geometry_constraint()
            .map_or_else(|| missing(file, "geometry"), malformed),
    })
}

fn property<'a>(
    file: &str,
    feature: &'a Value,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    feature
        .get("properties")
        .and_then(|properties| properties.get(field))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| missing(file, field))
}

fn missing(file: &str, field: &'static str) -> ValidationError {
    ValidationError::MissingField {
        file: file.to_owned(),
        field,
    }
}

/// Read `[lon, lat]` or `[lon, lat, alt]`, ignoring any altitude.
fn position_to_coord(position: &Value) -> Option<Coord<f64>> {
    match position.as_array()?.as_slice() {
        [lon, lat] | [lon, lat, _] => {
            let x = lon.as_f64()?;
            let y = lat.as_f64()?;
            (x.is_finite() && y.is_finite()).then_some(Coord { x, y })
        }
        _ => None,
    }
}
