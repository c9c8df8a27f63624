//! Command-line interface for inspecting a travel map corpus.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod content;
mod error;
mod style;

pub use error::CliError;

use content::{CheckArgs, PlacesArgs, RoutesArgs};
use style::StyleArgs;

const ARG_CONTENT_ROOT: &str = "content-root";
const ARG_ROUTE_REFS: &str = "route-refs";
const ARG_MAPTILER_KEY: &str = "maptiler-key";
const ENV_CHECK_ROUTE_REFS: &str = "TRAVELMAP_CMDS_CHECK_ROUTE_REFS";

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &mut stdout)
}

fn run_with(cli: Cli, writer: &mut dyn Write) -> Result<(), CliError> {
    match cli.command {
        Command::Places(args) => content::run_places(args, writer),
        Command::Routes(args) => content::run_routes(args, writer),
        Command::Check(args) => content::run_check(args, writer),
        Command::Style(args) => style::run_style(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "travelmap",
    about = "Inspect and validate travel map content",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every place as JSON, most recent first.
    Places(PlacesArgs),
    /// Print every route as JSON.
    Routes(RoutesArgs),
    /// Validate the whole corpus and summarise it.
    Check(CheckArgs),
    /// Print the base map style and initial camera.
    Style(StyleArgs),
}

fn write_json(writer: &mut dyn Write, value: &impl serde::Serialize) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    write_line(writer, &payload)
}

fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writer
        .write_all(line.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
