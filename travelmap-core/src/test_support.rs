//! Builders for small, valid places and routes used by unit and behaviour
//! tests across the workspace.

use geo::{Coord, LineString};

use crate::{Place, Route};

/// Build a valid place at the origin whose title and slug derive from `id`.
///
/// # Panics
/// Panics if `id` is empty.
#[must_use]
pub fn place(id: &str, date: &str) -> Place {
    place_at(id, date, Coord { x: 0.0, y: 0.0 })
}

/// Build a valid place at the given coordinates.
///
/// # Panics
/// Panics if `id` is empty.
#[must_use]
pub fn place_at(id: &str, date: &str, coords: Coord<f64>) -> Place {
    Place::new(id, format!("Place {id}"), date, coords, id).expect("fixture place is valid")
}

/// Build a valid two-point route.
///
/// # Panics
/// Panics if `id` is empty.
#[must_use]
pub fn route(id: &str) -> Route {
    let line = LineString::from(vec![(135.0, 35.0), (135.5, 34.5)]);
    Route::new(id, format!("Route {id}"), line).expect("fixture route is valid")
}
