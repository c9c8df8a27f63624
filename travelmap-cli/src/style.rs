//! The `style` command.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::json;
use travelmap_map::resolve_style;

use crate::{ARG_MAPTILER_KEY, CliError, write_json};

/// Process-wide credential read when no layer supplies a key.
const ENV_MAPTILER_KEY: &str = "TRAVELMAP_MAPTILER_KEY";

/// CLI arguments for the `style` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "style",
    about = "Print the base map style",
    long_about = "Resolve the base imagery style the map would use and print \
                  it with its zoom ceiling and initial camera. Without a \
                  tile-service key the keyless public imagery is chosen."
)]
#[ortho_config(prefix = "TRAVELMAP")]
pub(crate) struct StyleArgs {
    /// Tile-service key for the hosted satellite style.
    #[arg(long = ARG_MAPTILER_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) maptiler_key: Option<String>,
}

pub(crate) fn run_style(args: StyleArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let key = merged
        .maptiler_key
        .or_else(|| std::env::var(ENV_MAPTILER_KEY).ok());
    write_style(writer, key.as_deref())
}

pub(crate) fn write_style(writer: &mut dyn Write, key: Option<&str>) -> Result<(), CliError> {
    let resolved = resolve_style(key);
    let view = resolved.initial_view();
    write_json(
        writer,
        &json!({
            "style": resolved.style,
            "maxZoom": resolved.max_zoom,
            "initialView": {
                "center": [view.center.x, view.center.y],
                "zoom": view.zoom,
            },
        }),
    )
}
