//! Test helpers for building throwaway site roots.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::fs;
use tempfile::TempDir;

/// A site root with `content/places` and `content/routes` directories.
pub(super) struct SiteRoot {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SiteRoot {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        fs::create_dir_all(root.join("content/places")).expect("places dir");
        fs::create_dir_all(root.join("content/routes")).expect("routes dir");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn add_place(&self, id: &str, date: &str, route_refs: &[&str]) {
        let refs = route_refs.join(", ");
        let source = format!(
            "---\nid: {id}\ntitle: Place {id}\ndate: \"{date}\"\ncoords: [135.77, 34.97]\nrouteRefs: [{refs}]\n---\nNotes about {id}.\n"
        );
        fs::write(self.root.join(format!("content/places/{id}.mdx")), source)
            .expect("write place");
    }

    pub(super) fn add_route(&self, id: &str) {
        let source = format!(
            r#"{{"type":"Feature","properties":{{"id":"{id}","title":"Route {id}"}},"geometry":{{"type":"LineString","coordinates":[[135.0,35.0],[135.5,34.5]]}}}}"#
        );
        fs::write(self.root.join(format!("content/routes/{id}.geojson")), source)
            .expect("write route");
    }
}

/// Parse `argv` and run it, capturing standard output.
pub(super) fn run_captured(argv: &[&str]) -> (Result<(), super::CliError>, String) {
    let mut stdout = Vec::new();
    let result = super::Cli::try_parse_from(argv)
        .map_err(super::CliError::from)
        .and_then(|cli| super::run_with(cli, &mut stdout));
    let text = String::from_utf8(stdout).expect("utf-8 output");
    (result, text)
}
