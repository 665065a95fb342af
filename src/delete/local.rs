//! Mapping of local filesystem paths to their remote equivalents.

use std::path::Path;

use common::LocalDandiset;

use super::DeleteError;

/// Resolve a local path to the identifier of its enclosing Dandiset and
/// the POSIX path of the target relative to the Dandiset root. Directories
/// get a trailing slash so that they register as folder deletions.
pub fn find_local_asset(filepath: &Path) -> Result<(String, String), DeleteError> {
    let path = std::path::absolute(filepath)?;
    let start = path.parent().unwrap_or(&path);
    let dandiset = LocalDandiset::find(start)?.ok_or(DeleteError::NoDandisetRoot)?;
    let mut relpath = path
        .strip_prefix(&dandiset.path)
        .map_err(|_| DeleteError::NoDandisetRoot)?
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if path.is_dir() {
        relpath.push('/');
    }
    Ok((dandiset.identifier, relpath))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_dandiset(dir: &Path, identifier: &str) {
        fs::write(
            dir.join(common::DANDISET_METADATA_FILE),
            format!("identifier: '{identifier}'\n"),
        )
        .unwrap();
    }

    #[test]
    fn file_resolves_to_relative_posix_path() {
        let tmp = TempDir::new().unwrap();
        make_dandiset(tmp.path(), "000001");
        let sub = tmp.path().join("sub-01");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("func.nwb"), b"x").unwrap();

        let (id, relpath) = find_local_asset(&sub.join("func.nwb")).unwrap();
        assert_eq!(id, "000001");
        assert_eq!(relpath, "sub-01/func.nwb");
    }

    #[test]
    fn directory_gets_a_trailing_slash() {
        let tmp = TempDir::new().unwrap();
        make_dandiset(tmp.path(), "000002");
        fs::create_dir(tmp.path().join("sub-02")).unwrap();

        let (id, relpath) = find_local_asset(&tmp.path().join("sub-02")).unwrap();
        assert_eq!(id, "000002");
        assert_eq!(relpath, "sub-02/");
    }

    #[test]
    fn path_outside_any_dandiset_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = find_local_asset(&tmp.path().join("file.nwb")).unwrap_err();
        assert!(matches!(err, DeleteError::NoDandisetRoot));
    }
}
