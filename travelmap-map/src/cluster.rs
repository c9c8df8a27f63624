//! Hierarchical point clustering.
//!
//! Points are projected to Web-Mercator unit space and clustered greedily
//! one zoom level at a time, from the finest level down to the coarsest.
//! Each level keeps its own R*-tree so viewport queries and cluster
//! expansion are cheap lookups.
#![expect(
    clippy::float_arithmetic,
    reason = "mercator projection and weighted centroids need float maths"
)]

use std::f64::consts::PI;
use std::fmt;

use geo::{Coord, Rect};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use thiserror::Error;

/// Cluster radius in pixels.
pub const DEFAULT_RADIUS: f64 = 50.0;
/// Tile extent the radius is measured against.
pub const DEFAULT_EXTENT: f64 = 512.0;
/// Finest zoom at which points are still clustered.
pub const DEFAULT_MAX_ZOOM: u8 = 16;
/// Smallest number of points that forms a cluster.
pub const DEFAULT_MIN_POINTS: u32 = 2;
/// Hard ceiling for `max_zoom`.
pub const ZOOM_LIMIT: u8 = 24;

/// Tuning knobs for [`ClusterIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Cluster radius in pixels.
    pub radius: f64,
    /// Tile extent in pixels.
    pub extent: f64,
    /// Coarsest zoom level built.
    pub min_zoom: u8,
    /// Finest zoom level at which clustering happens.
    pub max_zoom: u8,
    /// Minimum members per cluster.
    pub min_points: u32,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            extent: DEFAULT_EXTENT,
            min_zoom: 0,
            max_zoom: DEFAULT_MAX_ZOOM,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

impl ClusterOptions {
    /// Set the cluster radius in pixels.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the zoom range, clamped to `0..=ZOOM_LIMIT` with `min <= max`.
    #[must_use]
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom.min(ZOOM_LIMIT);
        self.min_zoom = min_zoom.min(self.max_zoom);
        self
    }

    /// Set the minimum cluster size; values below two are raised to two.
    #[must_use]
    pub fn with_min_points(mut self, min_points: u32) -> Self {
        self.min_points = min_points.max(DEFAULT_MIN_POINTS);
        self
    }

    const fn leaf_zoom(&self) -> u8 {
        self.max_zoom.saturating_add(1)
    }
}

/// Identifier of a cluster within one [`ClusterIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId {
    origin_zoom: u8,
    index: usize,
}

impl ClusterId {
    /// Zoom level holding the cluster's direct children.
    #[must_use]
    pub const fn origin_zoom(self) -> u8 {
        self.origin_zoom
    }

    /// Finest zoom at which the cluster is drawn.
    #[must_use]
    pub const fn zoom(self) -> u8 {
        self.origin_zoom.saturating_sub(1)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin_zoom, self.index)
    }
}

/// Errors returned by cluster queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// No cluster with this identifier exists in the index.
    #[error("no cluster with id {id}")]
    UnknownCluster {
        /// The identifier that was looked up.
        id: ClusterId,
    },
}

/// A feature visible at some zoom: a single input point or a cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterFeature {
    /// A standalone input point.
    Point {
        /// Position of the point in the input slice.
        index: usize,
        /// Input coordinates.
        coords: Coord<f64>,
    },
    /// An aggregate of nearby points.
    Cluster {
        /// Cluster identifier for expansion queries.
        id: ClusterId,
        /// Number of input points in the cluster.
        count: u32,
        /// Weighted centre of the members.
        coords: Coord<f64>,
    },
}

impl ClusterFeature {
    /// Position of the feature.
    #[must_use]
    pub const fn coords(&self) -> Coord<f64> {
        match self {
            Self::Point { coords, .. } | Self::Cluster { coords, .. } => *coords,
        }
    }

    /// Number of input points represented.
    #[must_use]
    pub const fn count(&self) -> u32 {
        match self {
            Self::Point { .. } => 1,
            Self::Cluster { count, .. } => *count,
        }
    }

    /// Label for a cluster circle; `None` for single points.
    #[must_use]
    pub fn abbreviated_count(&self) -> Option<String> {
        match self {
            Self::Point { .. } => None,
            Self::Cluster { count, .. } => Some(abbreviate_count(*count)),
        }
    }
}

/// Abbreviate a count the way cluster labels show it: `999`, `1.2k`, `15k`.
///
/// # Examples
/// ```
/// use travelmap_map::abbreviate_count;
///
/// assert_eq!(abbreviate_count(42), "42");
/// assert_eq!(abbreviate_count(1_249), "1.2k");
/// assert_eq!(abbreviate_count(15_400), "15k");
/// ```
#[must_use]
pub fn abbreviate_count(count: u32) -> String {
    if count >= 10_000 {
        format!("{}k", count.saturating_add(500).div_euclid(1_000))
    } else if count >= 1_000 {
        let hundreds = count.saturating_add(50).div_euclid(100);
        let (whole, tenth) = (hundreds.div_euclid(10), hundreds.rem_euclid(10));
        if tenth == 0 {
            format!("{whole}k")
        } else {
            format!("{whole}.{tenth}k")
        }
    } else {
        count.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Point(usize),
    Cluster(ClusterId),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    x: f64,
    y: f64,
    count: u32,
    member: Member,
    parent: Option<ClusterId>,
}

type Entry = GeomWithData<[f64; 2], usize>;

#[derive(Debug, Default)]
struct Level {
    nodes: Vec<Node>,
    tree: RTree<Entry>,
}

impl Level {
    fn new(nodes: Vec<Node>) -> Self {
        let entries = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| Entry::new([node.x, node.y], index))
            .collect();
        Self {
            nodes,
            tree: RTree::bulk_load(entries),
        }
    }
}

/// Points clustered at every zoom from `min_zoom` to `max_zoom + 1`.
///
/// # Examples
/// ```
/// use geo::{Coord, Rect};
/// use travelmap_map::{ClusterIndex, ClusterOptions};
///
/// let points = [
///     Coord { x: 135.77, y: 34.97 },
///     Coord { x: 135.78, y: 34.98 },
///     Coord { x: -0.12, y: 51.50 },
/// ];
/// let index = ClusterIndex::new(&points, ClusterOptions::default());
/// let world = Rect::new(Coord { x: -180.0, y: -85.0 }, Coord { x: 180.0, y: 85.0 });
/// let features = index.clusters(world, 2);
/// assert_eq!(features.len(), 2);
/// assert_eq!(features.iter().map(|f| f.count()).sum::<u32>(), 3);
/// ```
#[derive(Debug)]
pub struct ClusterIndex {
    options: ClusterOptions,
    points: Vec<Coord<f64>>,
    levels: Vec<Level>,
}

impl ClusterIndex {
    /// Build the index. Points with non-finite coordinates are skipped.
    #[must_use]
    pub fn new(points: &[Coord<f64>], options: ClusterOptions) -> Self {
        let leaves = points
            .iter()
            .enumerate()
            .filter(|(_, coord)| coord.x.is_finite() && coord.y.is_finite())
            .map(|(index, coord)| Node {
                x: project_x(coord.x),
                y: project_y(coord.y),
                count: 1,
                member: Member::Point(index),
                parent: None,
            })
            .collect();

        let mut levels: Vec<Level> = (0..=options.leaf_zoom()).map(|_| Level::default()).collect();
        let mut current = Level::new(leaves);
        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let coarser = cluster_level(&mut current, zoom, &options);
            let finer = std::mem::replace(&mut current, Level::new(coarser));
            store(&mut levels, zoom.saturating_add(1), finer);
        }
        store(&mut levels, options.min_zoom, current);

        Self {
            options,
            points: points.to_vec(),
            levels,
        }
    }

    /// Options the index was built with.
    #[must_use]
    pub const fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Number of input points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Features intersecting `bbox` (longitude/latitude) at `zoom`.
    ///
    /// Zooms outside the built range are clamped. Results are in a stable
    /// order.
    #[must_use]
    pub fn clusters(&self, bbox: Rect<f64>, zoom: u8) -> Vec<ClusterFeature> {
        let Some(level) = self.level(zoom.clamp(self.options.min_zoom, self.options.leaf_zoom()))
        else {
            return Vec::new();
        };
        let envelope = AABB::from_corners(
            [project_x(bbox.min().x), project_y(bbox.max().y)],
            [project_x(bbox.max().x), project_y(bbox.min().y)],
        );
        let mut hits: Vec<usize> = level
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        hits.sort_unstable();
        hits.into_iter()
            .filter_map(|index| level.nodes.get(index))
            .map(|node| self.feature(node))
            .collect()
    }

    /// Direct children of a cluster, one zoom level finer.
    ///
    /// # Errors
    /// Returns [`ClusterError::UnknownCluster`] when `id` is not in the index.
    pub fn children(&self, id: ClusterId) -> Result<Vec<ClusterFeature>, ClusterError> {
        let children: Vec<ClusterFeature> = self
            .level(id.origin_zoom)
            .into_iter()
            .flat_map(|level| level.nodes.iter())
            .filter(|node| node.parent == Some(id))
            .map(|node| self.feature(node))
            .collect();
        if children.is_empty() {
            return Err(ClusterError::UnknownCluster { id });
        }
        Ok(children)
    }

    /// Input indices of the points inside a cluster, paginated.
    ///
    /// # Errors
    /// Returns [`ClusterError::UnknownCluster`] when `id` is not in the index.
    pub fn leaves(
        &self,
        id: ClusterId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<usize>, ClusterError> {
        let mut found = Vec::new();
        self.collect_leaves(id, &mut found)?;
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }

    fn collect_leaves(&self, id: ClusterId, found: &mut Vec<usize>) -> Result<(), ClusterError> {
        for child in self.children(id)? {
            match child {
                ClusterFeature::Point { index, .. } => found.push(index),
                ClusterFeature::Cluster { id: inner, .. } => self.collect_leaves(inner, found)?,
            }
        }
        Ok(())
    }

    /// Zoom at which a cluster splits into more than one feature.
    ///
    /// # Errors
    /// Returns [`ClusterError::UnknownCluster`] when `id` is not in the index.
    pub fn expansion_zoom(&self, id: ClusterId) -> Result<u8, ClusterError> {
        let mut current = id;
        let mut zoom = id.zoom();
        while zoom <= self.options.max_zoom {
            let children = self.children(current)?;
            zoom = zoom.saturating_add(1);
            match children.as_slice() {
                [ClusterFeature::Cluster { id: only, .. }] => current = *only,
                _ => break,
            }
        }
        Ok(zoom)
    }

    /// Cluster drawn under `coord` at `zoom`, if any.
    ///
    /// A cluster is hit when `coord` lies within the clustering radius of
    /// its centre; the nearest one wins. Renderer clicks carry a position
    /// and the integer zoom they were made at, so this maps them back onto
    /// the index.
    #[must_use]
    pub fn cluster_at(&self, coord: Coord<f64>, zoom: u8) -> Option<ClusterId> {
        if !(coord.x.is_finite() && coord.y.is_finite()) {
            return None;
        }
        let clamped = zoom.clamp(self.options.min_zoom, self.options.leaf_zoom());
        let level = self.level(clamped)?;
        let (x, y) = (project_x(coord.x), project_y(coord.y));
        let radius = self.options.radius / (self.options.extent * f64::from(clamped).exp2());
        level
            .tree
            .locate_within_distance([x, y], radius * radius)
            .filter_map(|entry| level.nodes.get(entry.data))
            .filter_map(|node| match node.member {
                Member::Cluster(id) => {
                    let (dx, dy) = (node.x - x, node.y - y);
                    Some((dx * dx + dy * dy, id))
                }
                Member::Point(_) => None,
            })
            .min_by(|left, right| left.0.total_cmp(&right.0))
            .map(|(_, id)| id)
    }

    fn level(&self, zoom: u8) -> Option<&Level> {
        self.levels.get(usize::from(zoom))
    }

    fn feature(&self, node: &Node) -> ClusterFeature {
        match node.member {
            Member::Point(index) => ClusterFeature::Point {
                index,
                coords: self.points.get(index).copied().unwrap_or(Coord {
                    x: unproject_x(node.x),
                    y: unproject_y(node.y),
                }),
            },
            Member::Cluster(id) => ClusterFeature::Cluster {
                id,
                count: node.count,
                coords: Coord {
                    x: unproject_x(node.x),
                    y: unproject_y(node.y),
                },
            },
        }
    }
}

fn store(levels: &mut [Level], zoom: u8, level: Level) {
    if let Some(slot) = levels.get_mut(usize::from(zoom)) {
        *slot = level;
    }
}

fn is_claimed(claimed: &[bool], index: usize) -> bool {
    claimed.get(index).copied().unwrap_or(true)
}

fn claim(claimed: &mut [bool], index: usize) {
    if let Some(flag) = claimed.get_mut(index) {
        *flag = true;
    }
}

/// Greedily merge the nodes of `level` into the nodes of the next coarser
/// level, recording each merged node's parent.
fn cluster_level(level: &mut Level, zoom: u8, options: &ClusterOptions) -> Vec<Node> {
    let radius = options.radius / (options.extent * f64::from(zoom).exp2());
    let mut claimed = vec![false; level.nodes.len()];
    let mut coarser = Vec::with_capacity(level.nodes.len());

    for seed in 0..level.nodes.len() {
        if is_claimed(&claimed, seed) {
            continue;
        }
        claim(&mut claimed, seed);
        let Some(&node) = level.nodes.get(seed) else {
            continue;
        };

        let mut neighbours: Vec<usize> = level
            .tree
            .locate_within_distance([node.x, node.y], radius * radius)
            .map(|entry| entry.data)
            .filter(|&index| !is_claimed(&claimed, index))
            .collect();
        neighbours.sort_unstable();
        let count = neighbours
            .iter()
            .filter_map(|&index| level.nodes.get(index))
            .fold(node.count, |total, other| total.saturating_add(other.count));

        if count > node.count && count >= options.min_points {
            let id = ClusterId {
                origin_zoom: zoom.saturating_add(1),
                index: seed,
            };
            let mut weighted_x = node.x * f64::from(node.count);
            let mut weighted_y = node.y * f64::from(node.count);
            for &index in &neighbours {
                claim(&mut claimed, index);
                if let Some(other) = level.nodes.get_mut(index) {
                    weighted_x += other.x * f64::from(other.count);
                    weighted_y += other.y * f64::from(other.count);
                    other.parent = Some(id);
                }
            }
            if let Some(seed_node) = level.nodes.get_mut(seed) {
                seed_node.parent = Some(id);
            }
            coarser.push(Node {
                x: weighted_x / f64::from(count),
                y: weighted_y / f64::from(count),
                count,
                member: Member::Cluster(id),
                parent: None,
            });
        } else {
            coarser.push(Node {
                parent: None,
                ..node
            });
            if count > 1 {
                for &index in &neighbours {
                    claim(&mut claimed, index);
                    if let Some(&other) = level.nodes.get(index) {
                        coarser.push(Node {
                            parent: None,
                            ..other
                        });
                    }
                }
            }
        }
    }
    coarser
}

fn project_x(lon: f64) -> f64 {
    lon / 360.0 + 0.5
}

fn project_y(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

fn unproject_x(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

fn unproject_y(y: f64) -> f64 {
    let angle = (180.0 - y * 360.0).to_radians();
    360.0 * angle.exp().atan() / PI - 90.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn world() -> Rect<f64> {
        Rect::new(Coord { x: -180.0, y: -85.0 }, Coord { x: 180.0, y: 85.0 })
    }

    /// Two points a few metres apart in Kyoto and one in Osaka.
    #[fixture]
    fn kansai() -> Vec<Coord<f64>> {
        vec![
            Coord { x: 135.772, y: 34.967 },
            Coord { x: 135.7721, y: 34.9671 },
            Coord { x: 135.502, y: 34.694 },
        ]
    }

    #[rstest]
    fn coarse_zoom_gathers_everything(kansai: Vec<Coord<f64>>) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        let features = index.clusters(world(), 0);
        assert_eq!(features.len(), 1);
        assert_eq!(features.first().map(ClusterFeature::count), Some(3));
    }

    #[rstest]
    fn leaf_zoom_shows_every_point(kansai: Vec<Coord<f64>>) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        let features = index.clusters(world(), 30);
        assert_eq!(
            features,
            kansai
                .iter()
                .enumerate()
                .map(|(index, coords)| ClusterFeature::Point {
                    index,
                    coords: *coords,
                })
                .collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn leaves_cover_every_member(kansai: Vec<Coord<f64>>) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        let Some(ClusterFeature::Cluster { id, .. }) = index.clusters(world(), 0).pop() else {
            panic!("expected a cluster at zoom 0");
        };
        let mut leaves = index.leaves(id, usize::MAX, 0).expect("known cluster");
        leaves.sort_unstable();
        assert_eq!(leaves, vec![0, 1, 2]);
        assert_eq!(index.leaves(id, 1, 1).expect("known cluster").len(), 1);
    }

    #[rstest]
    fn expansion_zoom_reveals_more_than_one_feature(kansai: Vec<Coord<f64>>) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        let Some(ClusterFeature::Cluster { id, .. }) = index.clusters(world(), 0).pop() else {
            panic!("expected a cluster at zoom 0");
        };
        let zoom = index.expansion_zoom(id).expect("known cluster");
        assert!(zoom > id.zoom());
        assert!(index.clusters(world(), zoom).len() > 1);
    }

    #[rstest]
    fn tight_pair_expands_past_the_last_clustered_zoom() {
        let pair = [Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0001, y: 0.0 }];
        let index = ClusterIndex::new(&pair, ClusterOptions::default());
        let Some(ClusterFeature::Cluster { id, count, .. }) = index.clusters(world(), 5).pop()
        else {
            panic!("expected a cluster");
        };
        assert_eq!(count, 2);
        assert_eq!(index.expansion_zoom(id), Ok(DEFAULT_MAX_ZOOM + 1));
    }

    #[rstest]
    fn unknown_clusters_are_errors() {
        let index = ClusterIndex::new(&[], ClusterOptions::default());
        let id = ClusterId {
            origin_zoom: 3,
            index: 0,
        };
        assert_eq!(index.children(id), Err(ClusterError::UnknownCluster { id }));
        assert_eq!(index.expansion_zoom(id), Err(ClusterError::UnknownCluster { id }));
        assert!(index.is_empty());
    }

    #[rstest]
    fn click_near_a_cluster_finds_it(kansai: Vec<Coord<f64>>) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        let Some(ClusterFeature::Cluster { id, .. }) = index.clusters(world(), 0).pop() else {
            panic!("expected a cluster at zoom 0");
        };
        let kyoto_station = Coord { x: 135.7588, y: 34.9858 };
        assert_eq!(index.cluster_at(kyoto_station, 0), Some(id));
        assert_eq!(index.expansion_zoom(id).map(|zoom| zoom > 0), Ok(true));
    }

    #[rstest]
    #[case(Coord { x: -0.12, y: 51.5 }, 0)]
    #[case(Coord { x: 135.772, y: 34.967 }, 30)]
    #[case(Coord { x: f64::NAN, y: 34.967 }, 0)]
    fn clicks_away_from_clusters_find_nothing(
        kansai: Vec<Coord<f64>>,
        #[case] at: Coord<f64>,
        #[case] zoom: u8,
    ) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        assert_eq!(index.cluster_at(at, zoom), None);
    }

    #[rstest]
    fn viewport_excludes_distant_points(kansai: Vec<Coord<f64>>) {
        let index = ClusterIndex::new(&kansai, ClusterOptions::default());
        let europe = Rect::new(Coord { x: -10.0, y: 35.0 }, Coord { x: 30.0, y: 60.0 });
        assert!(index.clusters(europe, 3).is_empty());
    }

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1_000, "1k")]
    #[case(1_049, "1k")]
    #[case(1_050, "1.1k")]
    #[case(9_949, "9.9k")]
    #[case(10_000, "10k")]
    #[case(15_499, "15k")]
    #[case(15_500, "16k")]
    fn abbreviates_counts(#[case] count: u32, #[case] expected: &str) {
        assert_eq!(abbreviate_count(count), expected);
    }

    #[rstest]
    #[case(0.0)]
    #[case(35.681)]
    #[case(-60.0)]
    fn projection_round_trips(#[case] lat: f64) {
        let back = unproject_y(project_y(lat));
        assert!((back - lat).abs() < 1e-9, "{lat} became {back}");
        assert!((unproject_x(project_x(139.767)) - 139.767).abs() < 1e-9);
    }

    #[rstest]
    fn options_are_clamped() {
        let options = ClusterOptions::default()
            .with_zoom_range(30, 40)
            .with_min_points(0);
        assert_eq!(options.max_zoom, ZOOM_LIMIT);
        assert_eq!(options.min_zoom, ZOOM_LIMIT);
        assert_eq!(options.min_points, DEFAULT_MIN_POINTS);
    }
}
