//! The on-disk content corpus.

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use travelmap_core::{PlaceWithHtml, Route, RouteRefPolicy, UnresolvedRouteRef, check_route_refs};

use crate::{ContentError, MarkupPipeline, load_places, load_routes};

/// Directory under the root holding place records.
pub const PLACES_DIR: &str = "content/places";
/// Directory under the root holding route records.
pub const ROUTES_DIR: &str = "content/routes";

/// Location of the place and route directories.
///
/// Every load reads the directories afresh; nothing is cached between
/// calls.
///
/// # Examples
/// ```no_run
/// use travelmap_content::Corpus;
///
/// # fn main() -> Result<(), travelmap_content::ContentError> {
/// let corpus = Corpus::from_root("site");
/// let places = corpus.load_places()?;
/// println!("{} places", places.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Corpus {
    places_dir: Utf8PathBuf,
    routes_dir: Utf8PathBuf,
    route_refs: RouteRefPolicy,
    markup: MarkupPipeline,
}

/// Both collections from a single load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCorpus {
    /// Hydrated places, most recent first.
    pub places: Vec<PlaceWithHtml>,
    /// Routes in file-name order.
    pub routes: Vec<Route>,
    /// Route references that matched no loaded route.
    pub unresolved: Vec<UnresolvedRouteRef>,
}

impl Corpus {
    /// Use explicit place and route directories.
    #[must_use]
    pub fn new(places_dir: impl Into<Utf8PathBuf>, routes_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            places_dir: places_dir.into(),
            routes_dir: routes_dir.into(),
            route_refs: RouteRefPolicy::default(),
            markup: MarkupPipeline::new(),
        }
    }

    /// Resolve the conventional `content/places` and `content/routes`
    /// directories beneath `root`.
    #[must_use]
    pub fn from_root(root: impl AsRef<Utf8Path>) -> Self {
        let base = root.as_ref();
        Self::new(base.join(PLACES_DIR), base.join(ROUTES_DIR))
    }

    /// Set how [`Corpus::load`] treats dangling route references.
    #[must_use]
    pub const fn with_route_ref_policy(mut self, policy: RouteRefPolicy) -> Self {
        self.route_refs = policy;
        self
    }

    /// Directory holding place records.
    #[must_use]
    pub fn places_dir(&self) -> &Utf8Path {
        &self.places_dir
    }

    /// Directory holding route records.
    #[must_use]
    pub fn routes_dir(&self) -> &Utf8Path {
        &self.routes_dir
    }

    /// Configured route reference policy.
    #[must_use]
    pub const fn route_ref_policy(&self) -> RouteRefPolicy {
        self.route_refs
    }

    /// List all places, most recent first.
    ///
    /// # Errors
    /// See [`load_places`].
    pub fn load_places(&self) -> Result<Vec<PlaceWithHtml>, ContentError> {
        load_places(&self.places_dir, &self.markup)
    }

    /// List all routes.
    ///
    /// # Errors
    /// See [`load_routes`].
    pub fn load_routes(&self) -> Result<Vec<Route>, ContentError> {
        load_routes(&self.routes_dir)
    }

    /// Load both collections and check route references against the
    /// configured policy.
    ///
    /// # Errors
    /// Returns any load error, or [`travelmap_core::ValidationError::UnresolvedRouteRef`]
    /// under [`RouteRefPolicy::Reject`].
    pub fn load(&self) -> Result<LoadedCorpus, ContentError> {
        let places = self.load_places()?;
        let routes = self.load_routes()?;
        let unresolved = check_route_refs(
            places.iter().map(|entry| &entry.place),
            &routes,
            self.route_refs,
        )?;
        for dangling in &unresolved {
            warn!(
                "place {} references unknown route {}",
                dangling.place_id, dangling.route_id
            );
        }
        Ok(LoadedCorpus {
            places,
            routes,
            unresolved,
        })
    }
}
