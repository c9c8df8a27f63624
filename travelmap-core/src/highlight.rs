//! Selection-driven route highlighting.
//!
//! Selecting a place reveals only the routes it references. The relation is
//! a pure function of the selection, recomputed on every change, so there is
//! no shared highlight state to keep in sync.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::{Place, Route, ValidationError};

/// Identifiers of the routes that should currently be visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet(BTreeSet<String>);

impl HighlightSet {
    /// An empty set: every route hidden.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Return `true` when the route should be visible.
    #[must_use]
    pub fn contains(&self, route_id: &str) -> bool {
        self.0.contains(route_id)
    }

    /// Number of highlighted routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when no route is highlighted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the highlighted identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Derive the highlight set for the current selection.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use travelmap_core::{Place, highlight_set};
///
/// # fn main() -> Result<(), travelmap_core::PlaceError> {
/// let place = Place::new("a", "A", "2024-01-01", Coord { x: 0.0, y: 0.0 }, "a")?
///     .with_route_refs(["coast"]);
/// assert!(highlight_set(Some(&place)).contains("coast"));
/// assert!(highlight_set(None).is_empty());
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn highlight_set(selected: Option<&Place>) -> HighlightSet {
    selected
        .map(|place| place.route_refs.iter().cloned().collect())
        .unwrap_or_default()
}

/// How to treat route references that name no loaded route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteRefPolicy {
    /// Leave dangling references inert; they simply highlight nothing.
    #[default]
    Ignore,
    /// Treat a dangling reference as a validation error.
    Reject,
}

impl RouteRefPolicy {
    /// Return the policy as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for RouteRefPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteRefPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("unknown route reference policy '{s}'")),
        }
    }
}

/// A route reference that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRouteRef {
    /// Identifier of the referencing place.
    pub place_id: String,
    /// Identifier that failed to resolve.
    pub route_id: String,
}

/// Check every place's route references against the loaded routes.
///
/// Under [`RouteRefPolicy::Ignore`] the dangling references are returned for
/// the caller to report. Under [`RouteRefPolicy::Reject`] the first one
/// becomes a [`ValidationError::UnresolvedRouteRef`].
pub fn check_route_refs<'a, I>(
    places: I,
    routes: &[Route],
    policy: RouteRefPolicy,
) -> Result<Vec<UnresolvedRouteRef>, ValidationError>
where
    I: IntoIterator<Item = &'a Place>,
{
    let known: HashSet<&str> = routes.iter().map(|route| route.id.as_str()).collect();
    let mut unresolved = Vec::new();
    for place in places {
        for route_id in place
            .route_refs
            .iter()
            .filter(|id| !known.contains(id.as_str()))
        {
            if policy == RouteRefPolicy::Reject {
                return Err(ValidationError::UnresolvedRouteRef {
                    place_id: place.id.clone(),
                    route_id: route_id.clone(),
                });
            }
            unresolved.push(UnresolvedRouteRef {
                place_id: place.id.clone(),
                route_id: route_id.clone(),
            });
        }
    }
    Ok(unresolved)
}
