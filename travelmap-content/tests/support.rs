//! Temporary corpus directories for behaviour and property tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;
use travelmap_content::{Corpus, PLACES_DIR, ROUTES_DIR};

/// A corpus rooted in a temporary directory that is removed on drop.
pub struct TempCorpus {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl TempCorpus {
    /// Create an empty root with no `content/` directories.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("create temporary directory: {err}"));
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temporary path {path:?} is not UTF-8"));
        Self { _dir: dir, root }
    }

    /// Root directory of the corpus.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// A loader over this root.
    pub fn corpus(&self) -> Corpus {
        Corpus::from_root(&self.root)
    }

    /// Write a raw place file.
    pub fn write_place(&self, name: &str, contents: &str) {
        write(&self.root.join(PLACES_DIR), name, contents);
    }

    /// Write a raw route file.
    pub fn write_route(&self, name: &str, contents: &str) {
        write(&self.root.join(ROUTES_DIR), name, contents);
    }

    /// Write a valid place file named after `id`.
    pub fn add_place(&self, id: &str, date: &str, route_refs: &[&str]) {
        self.write_place(&format!("{id}.mdx"), &place_source(id, date, route_refs));
    }

    /// Write a valid two-point route file named after `id`.
    pub fn add_route(&self, id: &str) {
        self.write_route(&format!("{id}.geojson"), &route_source(id));
    }
}

/// Source text for a valid place record.
pub fn place_source(id: &str, date: &str, route_refs: &[&str]) -> String {
    let refs = route_refs.join(", ");
    format!(
        "---\nid: {id}\ntitle: Place {id}\ndate: \"{date}\"\ncoords: [135.77, 34.97]\nrouteRefs: [{refs}]\n---\nNotes about **{id}**.\n"
    )
}

/// Source text for a valid route record.
pub fn route_source(id: &str) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{"id":"{id}","title":"Route {id}"}},"geometry":{{"type":"LineString","coordinates":[[135.0,35.0],[135.5,34.5]]}}}}"#
    )
}

fn write(dir: &Utf8Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).unwrap_or_else(|err| panic!("create {dir}: {err}"));
    let path = dir.join(name);
    fs::write(&path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
}
