//! Loading place records.
//!
//! Each place file carries a YAML metadata block and a markdown body. The
//! required fields are checked in a fixed order (`id`, `title`, `date`,
//! `coords`) so the first reported error is predictable.

use std::collections::HashMap;

use camino::Utf8Path;
use geo::Coord;
use log::{debug, info, warn};
use serde_yaml::{Mapping, Value};
use travelmap_core::{Photo, Place, PlaceWithHtml, ValidationError};

use crate::{ContentError, MarkupPipeline, dates, frontmatter};

/// File extensions recognised as place records.
pub const PLACE_EXTENSIONS: &[&str] = &["mdx", "md"];

/// Load every place file in `dir`, sorted most recent first.
///
/// A missing directory yields an empty collection. Any malformed record
/// aborts the whole load.
///
/// # Errors
/// Returns the first [`ContentError`] encountered across the batch.
pub fn load_places(
    dir: &Utf8Path,
    pipeline: &MarkupPipeline,
) -> Result<Vec<PlaceWithHtml>, ContentError> {
    let read_err = |source| ContentError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let Some(handle) = travelmap_fs::open_dir_if_exists(dir).map_err(read_err)? else {
        debug!("place directory {dir} is absent; loading no places");
        return Ok(Vec::new());
    };
    let mut names = Vec::new();
    for extension in PLACE_EXTENSIONS {
        let matching =
            travelmap_fs::file_names_with_extension(&handle, extension).map_err(read_err)?;
        names.extend(matching);
    }
    names.sort();

    let places = names
        .iter()
        .map(|name| {
            let source =
                travelmap_fs::read_to_string(&handle, name).map_err(|source| ContentError::Read {
                    path: dir.join(name),
                    source,
                })?;
            let slug = Utf8Path::new(name).file_stem().unwrap_or(name.as_str());
            parse_place(name, slug, &source, pipeline)
        })
        .collect::<Result<Vec<_>, _>>()?;

    ensure_unique(&names, &places)?;
    let sorted = sort_newest_first(places);
    info!("loaded {} places from {dir}", sorted.len());
    Ok(sorted)
}

/// Parse a single place file.
///
/// `file` names the record in error messages; `slug` becomes the place's
/// URL identifier.
///
/// # Errors
/// Returns [`ContentError::Validation`] for schema violations,
/// [`ContentError::Metadata`] for malformed YAML and
/// [`ContentError::Markup`] when the body cannot be rendered.
pub fn parse_place(
    file: &str,
    slug: &str,
    source: &str,
    pipeline: &MarkupPipeline,
) -> Result<PlaceWithHtml, ContentError> {
    let document = frontmatter::split(source);
    let metadata = parse_metadata(file, document.metadata)?;
    let fields = Fields {
        file,
        map: &metadata,
    };

    let id = fields.required_text("id")?;
    let title = fields.required_text("title")?;
    let date = fields.string("date")?;
    let coords = fields.coords()?;

    let required = Place::new(id, title, date, coords, slug)
        .map_err(|err| fields.invalid(err.field(), err.to_string()))?
        .with_tags(fields.optional_strings("tags")?)
        .with_photos(fields.photos()?)
        .with_route_refs(fields.optional_strings("routeRefs")?);
    let place = apply_optional_text(required, &fields)?;

    let body_html = pipeline
        .render(document.body)
        .map_err(|source| ContentError::Markup {
            file: file.to_owned(),
            source,
        })?;
    debug!("parsed place {} from {file}", place.id);
    Ok(PlaceWithHtml::new(place, body_html.into_string()))
}

fn apply_optional_text(mut place: Place, fields: &Fields<'_>) -> Result<Place, ValidationError> {
    if let Some(city) = fields.optional_text("city")? {
        place = place.with_city(city);
    }
    if let Some(country) = fields.optional_text("country")? {
        place = place.with_country(country);
    }
    if let Some(cover) = fields.optional_text("cover")? {
        place = place.with_cover(cover);
    }
    if let Some(audio) = fields.optional_text("audio")? {
        place = place.with_audio(audio);
    }
    Ok(place)
}

fn parse_metadata(file: &str, block: Option<&str>) -> Result<Mapping, ContentError> {
    let Some(raw) = block else {
        return Ok(Mapping::new());
    };
    let value: Value = serde_yaml::from_str(raw).map_err(|source| ContentError::Metadata {
        file: file.to_owned(),
        source,
    })?;
    match value {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ValidationError::InvalidField {
            file: file.to_owned(),
            field: "metadata",
            reason: "expected a mapping of fields".to_owned(),
        }
        .into()),
    }
}

/// Typed accessors over one file's metadata mapping.
struct Fields<'a> {
    file: &'a str,
    map: &'a Mapping,
}

impl<'a> Fields<'a> {
    fn get(&self, field: &str) -> Option<&'a Value> {
        match self.map.get(field) {
            None | Some(Value::Null) => None,
            present => present,
        }
    }

    fn missing(&self, field: &'static str) -> ValidationError {
        ValidationError::MissingField {
            file: self.file.to_owned(),
            field,
        }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidField {
            file: self.file.to_owned(),
            field,
            reason: reason.into(),
        }
    }

    fn string(&self, field: &'static str) -> Result<&'a str, ValidationError> {
        self.get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing(field))
    }

    fn required_text(&self, field: &'static str) -> Result<&'a str, ValidationError> {
        self.string(field)
            .and_then(|text| if text.is_empty() { Err(self.missing(field)) } else { Ok(text) })
    }

    fn coords(&self) -> Result<Coord<f64>, ValidationError> {
        let values = self
            .get("coords")
            .and_then(Value::as_sequence)
            .ok_or_else(|| self.missing("coords"))?;
        match values.as_slice() {
            [lon, lat] => match (lon.as_f64(), lat.as_f64()) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(self.missing("coords")),
            },
            _ => Err(self.missing("coords")),
        }
    }

    fn optional_text(&self, field: &'static str) -> Result<Option<&'a str>, ValidationError> {
        self.get(field)
            .map(|value| value.as_str().ok_or_else(|| self.invalid(field, "expected a string")))
            .transpose()
    }

    fn optional_strings(&self, field: &'static str) -> Result<Vec<&'a str>, ValidationError> {
        let Some(value) = self.get(field) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_sequence()
            .ok_or_else(|| self.invalid(field, "expected a list of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| self.invalid(field, "expected a list of strings"))
            })
            .collect()
    }

    fn photos(&self) -> Result<Vec<Photo>, ValidationError> {
        let Some(value) = self.get("photos") else {
            return Ok(Vec::new());
        };
        let items = value
            .as_sequence()
            .ok_or_else(|| self.invalid("photos", "expected a list of photos"))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.photo(index, item))
            .collect()
    }

    fn photo(&self, index: usize, item: &Value) -> Result<Photo, ValidationError> {
        let src = item
            .get("src")
            .and_then(Value::as_str)
            .filter(|src| !src.is_empty())
            .ok_or_else(|| self.invalid("photos", format!("photo {index} needs a 'src' string")))?;
        let caption = match item.get("caption") {
            None | Some(Value::Null) => None,
            Some(Value::String(caption)) => Some(caption.clone()),
            Some(_) => {
                return Err(self.invalid(
                    "photos",
                    format!("photo {index} has a non-string 'caption'"),
                ));
            }
        };
        Ok(Photo {
            src: src.to_owned(),
            caption,
        })
    }
}

fn ensure_unique(names: &[String], places: &[PlaceWithHtml]) -> Result<(), ValidationError> {
    let mut ids: HashMap<&str, &str> = HashMap::new();
    let mut slugs: HashMap<&str, &str> = HashMap::new();
    for (name, entry) in names.iter().zip(places) {
        if let Some(first) = ids.insert(entry.place.id.as_str(), name.as_str()) {
            return Err(ValidationError::DuplicateId {
                file: name.clone(),
                id: entry.place.id.clone(),
                first: first.to_owned(),
            });
        }
        if let Some(first) = slugs.insert(entry.place.slug.as_str(), name.as_str()) {
            return Err(ValidationError::DuplicateSlug {
                file: name.clone(),
                slug: entry.place.slug.clone(),
                first: first.to_owned(),
            });
        }
    }
    Ok(())
}

/// Stable sort, most recent date first, unparseable dates last.
fn sort_newest_first(places: Vec<PlaceWithHtml>) -> Vec<PlaceWithHtml> {
    let mut keyed: Vec<_> = places
        .into_iter()
        .map(|entry| {
            let key = dates::parse_date(&entry.place.date);
            if key.is_none() {
                warn!(
                    "place {} has unparseable date '{}'; ordering it last",
                    entry.place.id, entry.place.date
                );
            }
            (key, entry)
        })
        .collect();
    keyed.sort_by(|(lhs, _), (rhs, _)| dates::newest_first(*lhs, *rhs));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pipeline() -> MarkupPipeline {
        MarkupPipeline::new()
    }

    fn parse(pipeline: &MarkupPipeline, source: &str) -> Result<PlaceWithHtml, ContentError> {
        parse_place("kyoto.mdx", "kyoto", source, pipeline)
    }

    fn validation(err: ContentError) -> ValidationError {
        match err {
            ContentError::Validation(inner) => inner,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[rstest]
    fn parses_a_complete_record(pipeline: MarkupPipeline) {
        let source = "---\n\
id: kyoto-1\n\
title: Fushimi Inari\n\
date: 2024-01-10\n\
coords: [135.772, 34.967]\n\
city: Kyoto\n\
country: Japan\n\
tags: [shrine, hike]\n\
cover: /img/torii.jpg\n\
photos:\n  - src: /img/a.jpg\n    caption: Gates\n  - src: /img/b.jpg\n\
audio: /audio/wind.mp3\n\
routeRefs: [kansai]\n\
---\n\
Thousands of **torii**.\n";
        let entry = parse(&pipeline, source).expect("valid record");
        let place = &entry.place;
        assert_eq!(place.id, "kyoto-1");
        assert_eq!(place.slug, "kyoto");
        assert_eq!(place.date, "2024-01-10");
        assert_eq!(place.coords, Coord { x: 135.772, y: 34.967 });
        assert_eq!(place.city.as_deref(), Some("Kyoto"));
        assert_eq!(place.country.as_deref(), Some("Japan"));
        assert_eq!(place.tags, vec!["shrine".to_owned(), "hike".to_owned()]);
        assert_eq!(place.cover.as_deref(), Some("/img/torii.jpg"));
        assert_eq!(place.photos.len(), 2);
        assert_eq!(place.photos.first().and_then(|p| p.caption.as_deref()), Some("Gates"));
        assert_eq!(place.audio.as_deref(), Some("/audio/wind.mp3"));
        assert_eq!(place.route_refs, vec!["kansai".to_owned()]);
        assert!(entry.body_html.contains("<strong>torii</strong>"));
    }

    #[rstest]
    #[case("---\ntitle: T\ndate: d\ncoords: [1, 2]\n---\n", "id")]
    #[case("---\nid: ''\ntitle: T\ndate: d\ncoords: [1, 2]\n---\n", "id")]
    #[case("---\nid: 7\ntitle: T\ndate: d\ncoords: [1, 2]\n---\n", "id")]
    #[case("---\nid: a\ndate: d\ncoords: [1, 2]\n---\n", "title")]
    #[case("---\nid: a\ntitle: T\ncoords: [1, 2]\n---\n", "date")]
    #[case("---\nid: a\ntitle: T\ndate: d\n---\n", "coords")]
    #[case("---\nid: a\ntitle: T\ndate: d\ncoords: [1]\n---\n", "coords")]
    #[case("---\nid: a\ntitle: T\ndate: d\ncoords: [1, 2, 3]\n---\n", "coords")]
    #[case("---\nid: a\ntitle: T\ndate: d\ncoords: [east, 2]\n---\n", "coords")]
    #[case("---\ndate: 5\ncoords: nope\n---\n", "id")]
    #[case("no metadata at all", "id")]
    fn reports_the_first_missing_field(
        pipeline: MarkupPipeline,
        #[case] source: &str,
        #[case] field: &'static str,
    ) {
        let err = validation(parse(&pipeline, source).expect_err("invalid record"));
        assert_eq!(
            err,
            ValidationError::MissingField {
                file: "kyoto.mdx".to_owned(),
                field,
            }
        );
        let message = err.to_string();
        assert!(message.contains("kyoto.mdx") && message.contains(field), "{message}");
    }

    #[rstest]
    #[case("tags: shrine", "tags")]
    #[case("tags: [1, 2]", "tags")]
    #[case("city: [Kyoto]", "city")]
    #[case("routeRefs: kansai", "routeRefs")]
    #[case("photos: [{caption: x}]", "photos")]
    #[case("photos: [{src: a.jpg, caption: 3}]", "photos")]
    #[case("coords: [.nan, 1]", "coords")]
    fn rejects_malformed_optional_fields(
        pipeline: MarkupPipeline,
        #[case] line: &str,
        #[case] field: &'static str,
    ) {
        let coords = if field == "coords" { "" } else { "coords: [1, 2]\n" };
        let source = format!("---\nid: a\ntitle: T\ndate: d\n{coords}{line}\n---\n");
        let err = validation(parse(&pipeline, &source).expect_err("invalid field"));
        match err {
            ValidationError::InvalidField { field: found, .. } => assert_eq!(found, field),
            other => panic!("expected invalid field, got {other:?}"),
        }
    }

    #[rstest]
    fn null_optional_fields_are_absent(pipeline: MarkupPipeline) {
        let source = "---\nid: a\ntitle: T\ndate: d\ncoords: [1, 2]\ncity: ~\ntags:\n---\n";
        let entry = parse(&pipeline, source).expect("valid record");
        assert_eq!(entry.place.city, None);
        assert!(entry.place.tags.is_empty());
    }

    #[rstest]
    fn malformed_yaml_is_a_metadata_error(pipeline: MarkupPipeline) {
        let err = parse(&pipeline, "---\nid: [unclosed\n---\n").expect_err("bad yaml");
        assert!(matches!(err, ContentError::Metadata { ref file, .. } if file == "kyoto.mdx"));
        assert_eq!(err.file(), Some("kyoto.mdx"));
    }

    #[rstest]
    fn bodies_are_sanitized(pipeline: MarkupPipeline) {
        let source = "---\nid: a\ntitle: T\ndate: d\ncoords: [1, 2]\n---\nHi<script>alert(1)</script>\n\n- **list**\n";
        let entry = parse(&pipeline, source).expect("valid record");
        assert!(!entry.body_html.contains("<script"), "{}", entry.body_html);
        assert!(entry.body_html.contains("<li><strong>list</strong></li>"), "{}", entry.body_html);
    }
}
