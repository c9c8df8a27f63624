//! Visited locations.
//!
//! A [`Place`] carries the metadata parsed from a location record. The
//! hydrated [`PlaceWithHtml`] adds the sanitized body markup and is what
//! detail views consume; the map only ever sees the lightweight
//! [`PlaceSummary`].

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PlaceError;

/// Number of characters kept by [`PlaceWithHtml::description`].
const DESCRIPTION_CHARS: usize = 160;

/// A photo attached to a place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Photo {
    /// Image URI.
    pub src: String,
    /// Optional caption shown under the image.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub caption: Option<String>,
}

/// A single visited location.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. When
/// serialized they become the two-element array `[lon, lat]`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use travelmap_core::Place;
///
/// # fn main() -> Result<(), travelmap_core::PlaceError> {
/// let place = Place::new(
///     "kyoto-1",
///     "Fushimi Inari",
///     "2024-01-10",
///     Coord { x: 135.772, y: 34.967 },
///     "fushimi-inari",
/// )?
/// .with_route_refs(["kansai-loop"]);
/// assert_eq!(place.route_refs, vec!["kansai-loop".to_string()]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", try_from = "RawPlace")
)]
pub struct Place {
    /// Stable external identifier, unique across the corpus.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Calendar date as written in the source record.
    pub date: String,
    /// Position of the place.
    #[cfg_attr(feature = "serde", serde(with = "lon_lat"))]
    pub coords: Coord<f64>,
    /// City name.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub city: Option<String>,
    /// Country name.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub country: Option<String>,
    /// Free-form tags in authored order.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub tags: Vec<String>,
    /// Cover image URI.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub cover: Option<String>,
    /// Photo gallery in authored order.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub photos: Vec<Photo>,
    /// Audio clip URI.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub audio: Option<String>,
    /// Identifiers of the routes this place belongs to, without duplicates.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub route_refs: Vec<String>,
    /// URL-safe identifier derived from the source file name.
    pub slug: String,
}

impl Place {
    /// Validate the required fields and construct a [`Place`].
    ///
    /// Optional metadata starts empty; use the `with_*` methods to fill it.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        date: impl Into<String>,
        coords: Coord<f64>,
        slug: impl Into<String>,
    ) -> Result<Self, PlaceError> {
        let id = id.into();
        let title = title.into();
        let slug = slug.into();
        if id.is_empty() {
            return Err(PlaceError::EmptyId);
        }
        if title.is_empty() {
            return Err(PlaceError::EmptyTitle);
        }
        if slug.is_empty() {
            return Err(PlaceError::EmptySlug);
        }
        if !(coords.x.is_finite() && coords.y.is_finite()) {
            return Err(PlaceError::NonFiniteCoords);
        }
        Ok(Self {
            id,
            title,
            date: date.into(),
            coords,
            city: None,
            country: None,
            tags: Vec::new(),
            cover: None,
            photos: Vec::new(),
            audio: None,
            route_refs: Vec::new(),
            slug,
        })
    }

    /// Set the city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the country.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Replace the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cover image.
    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Replace the photo gallery.
    #[must_use]
    pub fn with_photos(mut self, photos: Vec<Photo>) -> Self {
        self.photos = photos;
        self
    }

    /// Set the audio clip.
    #[must_use]
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Replace the route references, dropping repeats but keeping first-seen order.
    #[must_use]
    pub fn with_route_refs<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut route_refs: Vec<String> = Vec::new();
        for reference in refs {
            let reference = reference.into();
            if !route_refs.contains(&reference) {
                route_refs.push(reference);
            }
        }
        self.route_refs = route_refs;
        self
    }

    /// Project the place into the point list handed to the map.
    #[must_use]
    pub fn summary(&self) -> PlaceSummary {
        PlaceSummary::from(self)
    }
}

/// Wire form of a [`Place`]; decoding goes through [`Place::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlace {
    id: String,
    title: String,
    date: String,
    #[serde(with = "lon_lat")]
    coords: Coord<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    photos: Vec<Photo>,
    #[serde(default)]
    audio: Option<String>,
    #[serde(default)]
    route_refs: Vec<String>,
    slug: String,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPlace> for Place {
    type Error = PlaceError;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        let place = Self::new(raw.id, raw.title, raw.date, raw.coords, raw.slug)?;
        Ok(Self {
            city: raw.city,
            country: raw.country,
            tags: raw.tags,
            cover: raw.cover,
            photos: raw.photos,
            audio: raw.audio,
            ..place
        }
        .with_route_refs(raw.route_refs))
    }
}

/// A place together with its sanitized body markup.
///
/// `body_html` has already been through the sanitizer and may be injected
/// into a page as raw markup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlaceWithHtml {
    /// Parsed metadata.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub place: Place,
    /// Sanitized markup rendered from the record body.
    pub body_html: String,
}

impl PlaceWithHtml {
    /// Pair a place with its rendered body.
    #[must_use]
    pub fn new(place: Place, body_html: impl Into<String>) -> Self {
        Self {
            place,
            body_html: body_html.into(),
        }
    }

    /// Project the place into the point list handed to the map.
    #[must_use]
    pub fn summary(&self) -> PlaceSummary {
        self.place.summary()
    }

    /// Short plain-text description taken from the start of the body.
    ///
    /// Markup tags are dropped, character references such as `&amp;` are
    /// decoded and runs of whitespace collapse to one space. The cut is made
    /// on the decoded text.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use travelmap_core::{Place, PlaceWithHtml};
    ///
    /// # fn main() -> Result<(), travelmap_core::PlaceError> {
    /// let place = Place::new("a", "A", "2024-01-01", Coord { x: 0.0, y: 0.0 }, "a")?;
    /// let hydrated = PlaceWithHtml::new(place, "<p>Quiet <em>shrine</em> &amp; pond</p>");
    /// assert_eq!(hydrated.description(), "Quiet shrine & pond");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn description(&self) -> String {
        let mut text = String::new();
        let mut in_tag = false;
        let mut pending_space = false;
        let mut chars = self.body_html.chars();
        while let Some(ch) = chars.next() {
            let decoded = match ch {
                '<' => {
                    in_tag = true;
                    continue;
                }
                '>' if in_tag => {
                    in_tag = false;
                    continue;
                }
                _ if in_tag => continue,
                '&' => decode_reference(&mut chars),
                c => c,
            };
            if decoded.is_whitespace() {
                pending_space = !text.is_empty();
                continue;
            }
            if pending_space {
                text.push(' ');
                pending_space = false;
            }
            text.push(decoded);
        }
        text.chars().take(DESCRIPTION_CHARS).collect()
    }
}

/// Longest reference name considered, `#x10FFFF` included.
const MAX_REFERENCE_LEN: usize = 8;

/// Decode the character reference following an `&`, advancing `chars` past
/// it. Unknown or unterminated references leave `chars` alone and yield the
/// `&` itself.
fn decode_reference(chars: &mut std::str::Chars<'_>) -> char {
    let rest = chars.as_str();
    let Some((end, _)) = rest
        .char_indices()
        .take(MAX_REFERENCE_LEN.saturating_add(1))
        .find(|(_, c)| *c == ';')
    else {
        return '&';
    };
    let (Some(name), Some(after)) = (rest.get(..end), rest.get(end.saturating_add(1)..)) else {
        return '&';
    };
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        numeric => numeric.strip_prefix('#').and_then(|code| {
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse().ok(),
            };
            value.and_then(char::from_u32)
        }),
    };
    match decoded {
        Some(c) => {
            *chars = after.chars();
            c
        }
        None => '&',
    }
}

/// The reduced view of a place used to position map features.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaceSummary {
    /// Place identifier, echoed back in selection events.
    pub id: String,
    /// Label for the point feature.
    pub title: String,
    /// Position of the point feature.
    #[cfg_attr(feature = "serde", serde(with = "lon_lat"))]
    pub coords: Coord<f64>,
}

impl From<&Place> for PlaceSummary {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            title: place.title.clone(),
            coords: place.coords,
        }
    }
}

/// Find a hydrated place by slug, as detail pages do.
#[must_use]
pub fn find_by_slug<'a>(places: &'a [PlaceWithHtml], slug: &str) -> Option<&'a PlaceWithHtml> {
    places.iter().find(|candidate| candidate.place.slug == slug)
}

/// Find a hydrated place by identifier, as selection handlers do.
#[must_use]
pub fn find_by_id<'a>(places: &'a [PlaceWithHtml], id: &str) -> Option<&'a PlaceWithHtml> {
    places.iter().find(|candidate| candidate.place.id == id)
}

/// Serialize a coordinate as the GeoJSON position `[lon, lat]`.
#[cfg(feature = "serde")]
pub(crate) mod lon_lat {
    use geo::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(crate) fn serialize<S>(coord: &Coord<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [coord.x, coord.y].serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Coord<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Coord { x, y })
    }
}
