//! Error types for the travel map domain.
//!
//! [`ValidationError`] is the batch-level taxonomy reported by the content
//! pipeline. Every variant names the source file so a data-entry mistake can
//! be traced back to the record that caused it. [`PlaceError`] and
//! [`RouteError`] are the narrower errors returned by the entity
//! constructors.

use std::fmt;

use thiserror::Error;

/// Shape constraint violated by a route geometry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryConstraint {
    /// The top-level object was not a GeoJSON `Feature`.
    NotAFeature,
    /// The geometry type was not `LineString`.
    NotALineString {
        /// Geometry type found in the file, if any.
        found: Option<String>,
    },
    /// The geometry carried no coordinate array.
    CoordinatesNotArray,
    /// The line had fewer than two positions.
    TooFewPositions {
        /// Number of positions found.
        found: usize,
    },
    /// A position was not a pair of finite numbers.
    InvalidPosition {
        /// Zero-based index of the offending position.
        index: usize,
    },
}

impl fmt::Display for GeometryConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAFeature => f.write_str("expected a GeoJSON Feature"),
            Self::NotALineString { found: Some(kind) } => {
                write!(f, "expected LineString geometry, found {kind}")
            }
            Self::NotALineString { found: None } => {
                f.write_str("expected LineString geometry, found none")
            }
            Self::CoordinatesNotArray => f.write_str("coordinates must be an array"),
            Self::TooFewPositions { found } => {
                write!(f, "a line needs at least two positions, found {found}")
            }
            Self::InvalidPosition { index } => {
                write!(f, "position {index} is not a pair of finite numbers")
            }
        }
    }
}

/// Errors raised while validating a batch of source records.
///
/// Any of these aborts the whole load: a corpus with one bad record yields no
/// entities at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required metadata field was absent or had the wrong type.
    #[error("missing or invalid '{field}' in {file}")]
    MissingField {
        /// Source file name.
        file: String,
        /// Name of the offending field.
        field: &'static str,
    },
    /// An optional metadata field was present but malformed.
    #[error("invalid '{field}' in {file}: {reason}")]
    InvalidField {
        /// Source file name.
        file: String,
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A route file did not describe a usable line geometry.
    #[error("malformed geometry in {file}: {constraint}")]
    MalformedGeometry {
        /// Source file name.
        file: String,
        /// Constraint the geometry violated.
        constraint: GeometryConstraint,
    },
    /// Two records declared the same identifier.
    #[error("duplicate id '{id}' in {file} (already declared in {first})")]
    DuplicateId {
        /// File containing the second declaration.
        file: String,
        /// The repeated identifier.
        id: String,
        /// File containing the first declaration.
        first: String,
    },
    /// Two place files resolved to the same slug.
    #[error("duplicate slug '{slug}' in {file} (already used by {first})")]
    DuplicateSlug {
        /// File producing the second slug.
        file: String,
        /// The repeated slug.
        slug: String,
        /// File producing the first slug.
        first: String,
    },
    /// A place referenced a route that does not exist.
    #[error("place '{place_id}' references unknown route '{route_id}'")]
    UnresolvedRouteRef {
        /// Identifier of the referencing place.
        place_id: String,
        /// Identifier that failed to resolve.
        route_id: String,
    },
}

impl ValidationError {
    /// Return the source file named by the error, if any.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::MissingField { file, .. }
            | Self::InvalidField { file, .. }
            | Self::MalformedGeometry { file, .. }
            | Self::DuplicateId { file, .. }
            | Self::DuplicateSlug { file, .. } => Some(file),
            Self::UnresolvedRouteRef { .. } => None,
        }
    }
}

/// Errors returned by [`crate::Place::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    /// The identifier was empty.
    #[error("place id must not be empty")]
    EmptyId,
    /// The title was empty.
    #[error("place title must not be empty")]
    EmptyTitle,
    /// The slug was empty.
    #[error("place slug must not be empty")]
    EmptySlug,
    /// A coordinate component was NaN or infinite.
    #[error("place coordinates must be finite")]
    NonFiniteCoords,
}

impl PlaceError {
    /// Name of the field the error concerns.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId => "id",
            Self::EmptyTitle => "title",
            Self::EmptySlug => "slug",
            Self::NonFiniteCoords => "coords",
        }
    }
}

/// Errors returned by [`crate::Route::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The identifier was empty.
    #[error("route id must not be empty")]
    EmptyId,
    /// The title was empty.
    #[error("route title must not be empty")]
    EmptyTitle,
    /// The line had fewer than two positions.
    #[error("route geometry needs at least two positions, found {found}")]
    TooFewPositions {
        /// Number of positions supplied.
        found: usize,
    },
    /// A position contained NaN or infinite components.
    #[error("route position {index} is not finite")]
    NonFinitePosition {
        /// Zero-based index of the offending position.
        index: usize,
    },
}

impl RouteError {
    /// Translate a constructor error into the geometry taxonomy, if it is one.
    #[must_use]
    pub const fn geometry_constraint(&self) -> Option<GeometryConstraint> {
        match self {
            Self::TooFewPositions { found } => {
                Some(GeometryConstraint::TooFewPositions { found: *found })
            }
            Self::NonFinitePosition { index } => {
                Some(GeometryConstraint::InvalidPosition { index: *index })
            }
            Self::EmptyId | Self::EmptyTitle => None,
        }
    }
}
