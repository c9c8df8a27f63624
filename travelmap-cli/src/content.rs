//! Corpus commands: `places`, `routes` and `check`.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use travelmap_content::{Corpus, LoadedCorpus};
use travelmap_core::RouteRefPolicy;

use crate::{
    ARG_CONTENT_ROOT, ARG_ROUTE_REFS, CliError, ENV_CHECK_ROUTE_REFS, write_json, write_line,
};

const DEFAULT_CONTENT_ROOT: &str = ".";

/// CLI arguments for the `places` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "places",
    about = "Print every place as JSON",
    long_about = "Load every place record under <root>/content/places, \
                  render its body to sanitized HTML and print the list, \
                  most recent first."
)]
#[ortho_config(prefix = "TRAVELMAP")]
pub(crate) struct PlacesArgs {
    /// Site root containing the `content/` directory.
    #[arg(long = ARG_CONTENT_ROOT, value_name = "dir")]
    #[serde(default)]
    pub(crate) content_root: Option<Utf8PathBuf>,
}

/// CLI arguments for the `routes` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "routes",
    about = "Print every route as JSON",
    long_about = "Load every GeoJSON route under <root>/content/routes and \
                  print the list in file-name order."
)]
#[ortho_config(prefix = "TRAVELMAP")]
pub(crate) struct RoutesArgs {
    /// Site root containing the `content/` directory.
    #[arg(long = ARG_CONTENT_ROOT, value_name = "dir")]
    #[serde(default)]
    pub(crate) content_root: Option<Utf8PathBuf>,
}

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "check",
    about = "Validate the whole corpus",
    long_about = "Load places and routes together, check route references \
                  against the loaded routes and print a summary. With \
                  --route-refs reject a dangling reference fails the check."
)]
#[ortho_config(prefix = "TRAVELMAP")]
pub(crate) struct CheckArgs {
    /// Site root containing the `content/` directory.
    #[arg(long = ARG_CONTENT_ROOT, value_name = "dir")]
    #[serde(default)]
    pub(crate) content_root: Option<Utf8PathBuf>,
    /// How to treat route references naming no route: `ignore` or `reject`.
    #[arg(long = ARG_ROUTE_REFS, value_name = "policy")]
    #[serde(default)]
    pub(crate) route_refs: Option<String>,
}

/// Resolved configuration shared by the corpus commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentConfig {
    pub(crate) content_root: Utf8PathBuf,
    pub(crate) route_refs: RouteRefPolicy,
}

impl ContentConfig {
    fn new(content_root: Option<Utf8PathBuf>) -> Self {
        Self {
            content_root: content_root.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CONTENT_ROOT)),
            route_refs: RouteRefPolicy::default(),
        }
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_directory(&self.content_root, ARG_CONTENT_ROOT)
    }

    fn require_directory(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match travelmap_fs::dir_exists(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingContentRoot {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectContentRoot {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub(crate) fn corpus(&self) -> Corpus {
        Corpus::from_root(&self.content_root).with_route_ref_policy(self.route_refs)
    }
}

impl From<PlacesArgs> for ContentConfig {
    fn from(args: PlacesArgs) -> Self {
        Self::new(args.content_root)
    }
}

impl From<RoutesArgs> for ContentConfig {
    fn from(args: RoutesArgs) -> Self {
        Self::new(args.content_root)
    }
}

impl TryFrom<CheckArgs> for ContentConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let route_refs = args
            .route_refs
            .as_deref()
            .map(str::parse::<RouteRefPolicy>)
            .transpose()
            .map_err(|reason| CliError::InvalidPolicy {
                field: ARG_ROUTE_REFS,
                env: ENV_CHECK_ROUTE_REFS,
                reason,
            })?
            .unwrap_or_default();
        Ok(Self {
            route_refs,
            ..Self::new(args.content_root)
        })
    }
}

fn resolve(config: ContentConfig) -> Result<ContentConfig, CliError> {
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn run_places(args: PlacesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = resolve(ContentConfig::from(merged))?;
    let places = config.corpus().load_places()?;
    write_json(writer, &places)
}

pub(crate) fn run_routes(args: RoutesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = resolve(ContentConfig::from(merged))?;
    let routes = config.corpus().load_routes()?;
    write_json(writer, &routes)
}

pub(crate) fn run_check(args: CheckArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = resolve(ContentConfig::try_from(merged)?)?;
    let loaded = config.corpus().load()?;
    write_summary(writer, &loaded)
}

fn write_summary(writer: &mut dyn Write, loaded: &LoadedCorpus) -> Result<(), CliError> {
    write_line(writer, &format!("places: {}", loaded.places.len()))?;
    write_line(writer, &format!("routes: {}", loaded.routes.len()))?;
    write_line(
        writer,
        &format!("unresolved route references: {}", loaded.unresolved.len()),
    )?;
    for reference in &loaded.unresolved {
        write_line(
            writer,
            &format!("  {} -> {}", reference.place_id, reference.route_id),
        )?;
    }
    Ok(())
}
