//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Content directories are opened once with ambient authority; every read
//! below that point goes through the directory capability.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open a directory, returning `Ok(None)` when it does not exist.
pub fn open_dir_if_exists(path: &Utf8Path) -> io::Result<Option<fs_utf8::Dir>> {
    match fs_utf8::Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Return whether `path` exists and is a directory.
pub fn dir_exists(path: &Utf8Path) -> io::Result<bool> {
    Ok(open_dir_if_exists(path)?.is_some())
}

/// List the regular files in `dir` whose extension is `extension`.
///
/// Names are returned sorted so callers see the same order on every
/// platform and every run.
pub fn file_names_with_extension(dir: &fs_utf8::Dir, extension: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in dir.entries()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name()?;
        if Utf8Path::new(&name).extension() == Some(extension) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Read a UTF-8 file relative to `dir`.
pub fn read_to_string(dir: &fs_utf8::Dir, name: &str) -> io::Result<String> {
    dir.read_to_string(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temporary directory")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path")
    }

    #[rstest]
    fn missing_directory_is_none(temp_dir: TempDir) {
        let missing = utf8(&temp_dir).join("absent");
        assert!(open_dir_if_exists(&missing).expect("open").is_none());
        assert!(!dir_exists(&missing).expect("exists"));
    }

    #[rstest]
    fn lists_matching_files_sorted(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        for name in ["b.mdx", "a.mdx", "notes.txt"] {
            fs::write(root.join(name), "x").expect("write file");
        }
        fs::create_dir(root.join("nested.mdx")).expect("create dir");
        let dir = open_dir_if_exists(&root).expect("open").expect("present");
        let names = file_names_with_extension(&dir, "mdx").expect("list");
        assert_eq!(names, vec!["a.mdx".to_owned(), "b.mdx".to_owned()]);
        assert_eq!(read_to_string(&dir, "a.mdx").expect("read"), "x");
    }
}
