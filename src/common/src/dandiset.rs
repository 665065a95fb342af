use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Marker file identifying the root of a local Dandiset checkout.
pub const DANDISET_METADATA_FILE: &str = "dandiset.yaml";

/// A Dandiset found on the local filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDandiset {
    /// Root directory, the one containing the metadata marker file
    pub path: PathBuf,
    /// Identifier recorded in the metadata file
    pub identifier: String,
}

impl LocalDandiset {
    /// Walk upward from `start` until a directory containing the metadata
    /// marker is found. Returns `None` when no enclosing Dandiset exists.
    pub fn find(start: &Path) -> io::Result<Option<LocalDandiset>> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let marker = d.join(DANDISET_METADATA_FILE);
            if marker.is_file() {
                let identifier = read_identifier(&marker)?;
                return Ok(identifier.map(|identifier| LocalDandiset {
                    path: d.to_path_buf(),
                    identifier,
                }));
            }
            dir = d.parent();
        }
        Ok(None)
    }
}

/// Pull the `identifier:` field out of the metadata file. The file is YAML,
/// but the identifier is always a top-level scalar, so a line scan suffices.
fn read_identifier(marker: &Path) -> io::Result<Option<String>> {
    let contents = fs::read_to_string(marker)?;
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("identifier:") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            if !value.is_empty() {
                return Ok(Some(value.to_string()));
            }
        }
    }
    tracing::warn!(path = %marker.display(), "metadata file has no identifier");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_dandiset(dir: &Path, identifier: &str) {
        fs::write(
            dir.join(DANDISET_METADATA_FILE),
            format!("identifier: '{identifier}'\nname: Test Dandiset\n"),
        )
        .unwrap();
    }

    #[test]
    fn find_walks_up_to_the_marker() {
        let tmp = TempDir::new().unwrap();
        make_dandiset(tmp.path(), "000123");
        let nested = tmp.path().join("sub-01").join("ses-01");
        fs::create_dir_all(&nested).unwrap();

        let found = LocalDandiset::find(&nested).unwrap().unwrap();
        assert_eq!(found.identifier, "000123");
        assert_eq!(found.path, tmp.path());
    }

    #[test]
    fn find_returns_none_without_marker() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(LocalDandiset::find(tmp.path()).unwrap(), None);
    }

    #[test]
    fn identifier_without_quotes_parses() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(DANDISET_METADATA_FILE),
            "identifier: 000456\n",
        )
        .unwrap();
        let found = LocalDandiset::find(tmp.path()).unwrap().unwrap();
        assert_eq!(found.identifier, "000456");
    }
}
