//! Local dataset validation: layout and file-hygiene rules producing a
//! stream of typed findings.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use common::{DANDISET_METADATA_FILE, LocalDandiset};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "HINT"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One finding produced by a validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    /// Stable rule identifier, e.g. "DANDI.NO_DANDISET_FOUND"
    pub id: &'static str,
    pub severity: Severity,
    pub message: String,
    /// File the finding applies to, when file-scoped
    pub path: Option<PathBuf>,
    /// Root of the dataset the finding applies to, when known
    pub dataset_path: Option<PathBuf>,
}

impl ValidationResult {
    /// The path the finding should be displayed under.
    pub fn scope(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .or(self.dataset_path.as_deref())
    }
}

/// A source of findings for one local path.
pub trait DatasetValidator {
    fn name(&self) -> &'static str;
    fn validate(&self, path: &Path) -> io::Result<Vec<ValidationResult>>;
}

/// Checks that a path belongs to a well-formed Dandiset: marker file with
/// a parseable identifier, and asset paths free of hygiene problems.
pub struct DandisetLayoutValidator;

impl DandisetLayoutValidator {
    fn check_identifier(&self, dandiset: &LocalDandiset, out: &mut Vec<ValidationResult>) {
        let id = &dandiset.identifier;
        if id.len() != 6 || !id.chars().all(|c| c.is_ascii_digit()) {
            out.push(ValidationResult {
                id: "DANDI.INVALID_IDENTIFIER",
                severity: Severity::Error,
                message: format!("Dandiset identifier {id:?} is not six digits"),
                path: Some(dandiset.path.join(DANDISET_METADATA_FILE)),
                dataset_path: Some(dandiset.path.clone()),
            });
        }
    }

    fn check_file(
        &self,
        dandiset_path: &Path,
        file: &Path,
        out: &mut Vec<ValidationResult>,
    ) -> io::Result<()> {
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.starts_with('.') {
            out.push(ValidationResult {
                id: "DANDI.HIDDEN_PATH",
                severity: Severity::Warning,
                message: format!("hidden file or directory {name:?}"),
                path: Some(file.to_path_buf()),
                dataset_path: Some(dandiset_path.to_path_buf()),
            });
        }
        if name.contains('\\') || name.chars().any(|c| c.is_control()) {
            out.push(ValidationResult {
                id: "DANDI.INVALID_CHARACTERS",
                severity: Severity::Error,
                message: format!("path component {name:?} contains unsupported characters"),
                path: Some(file.to_path_buf()),
                dataset_path: Some(dandiset_path.to_path_buf()),
            });
        }
        if file.is_file() && fs::metadata(file)?.len() == 0 {
            out.push(ValidationResult {
                id: "DANDI.EMPTY_FILE",
                severity: Severity::Warning,
                message: "file is empty".to_string(),
                path: Some(file.to_path_buf()),
                dataset_path: Some(dandiset_path.to_path_buf()),
            });
        }
        Ok(())
    }

    fn walk(
        &self,
        dandiset_path: &Path,
        dir: &Path,
        out: &mut Vec<ValidationResult>,
    ) -> io::Result<()> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|e| e.map(|e| e.path()))
            .collect::<io::Result<_>>()?;
        entries.sort();
        for entry in entries {
            if entry.file_name().map(|n| n == DANDISET_METADATA_FILE) == Some(true) {
                continue;
            }
            self.check_file(dandiset_path, &entry, out)?;
            if entry.is_dir() {
                self.walk(dandiset_path, &entry, out)?;
            }
        }
        Ok(())
    }
}

impl DatasetValidator for DandisetLayoutValidator {
    fn name(&self) -> &'static str {
        "dandi-layout"
    }

    fn validate(&self, path: &Path) -> io::Result<Vec<ValidationResult>> {
        let mut out = Vec::new();
        let start = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        let Some(dandiset) = LocalDandiset::find(start)? else {
            out.push(ValidationResult {
                id: "DANDI.NO_DANDISET_FOUND",
                severity: Severity::Error,
                message: format!("no {DANDISET_METADATA_FILE} found above {}", path.display()),
                path: Some(path.to_path_buf()),
                dataset_path: None,
            });
            return Ok(out);
        };
        self.check_identifier(&dandiset, &mut out);
        if path.is_dir() {
            self.walk(&dandiset.path, path, &mut out)?;
        } else {
            self.check_file(&dandiset.path, path, &mut out)?;
        }
        Ok(out)
    }
}

/// Run every built-in validator over every path, findings concatenated in
/// input order.
pub fn validate_paths(paths: &[PathBuf]) -> io::Result<Vec<ValidationResult>> {
    let validators: [&dyn DatasetValidator; 1] = [&DandisetLayoutValidator];
    let mut findings = Vec::new();
    for path in paths {
        for validator in validators {
            tracing::debug!(validator = validator.name(), path = %path.display(), "validating");
            findings.extend(validator.validate(path)?);
        }
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_dandiset(dir: &Path, identifier: &str) {
        fs::write(
            dir.join(DANDISET_METADATA_FILE),
            format!("identifier: '{identifier}'\n"),
        )
        .unwrap();
    }

    #[test]
    fn well_formed_dandiset_has_no_findings() {
        let tmp = TempDir::new().unwrap();
        make_dandiset(tmp.path(), "000001");
        fs::create_dir(tmp.path().join("sub-01")).unwrap();
        fs::write(tmp.path().join("sub-01").join("func.nwb"), b"data").unwrap();

        let findings = validate_paths(&[tmp.path().to_path_buf()]).unwrap();
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn missing_marker_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let findings = validate_paths(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, "DANDI.NO_DANDISET_FOUND");
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn bad_identifier_and_empty_file_are_reported() {
        let tmp = TempDir::new().unwrap();
        make_dandiset(tmp.path(), "abc");
        fs::write(tmp.path().join("empty.nwb"), b"").unwrap();

        let findings = validate_paths(&[tmp.path().to_path_buf()]).unwrap();
        let ids: Vec<&str> = findings.iter().map(|f| f.id).collect();
        assert!(ids.contains(&"DANDI.INVALID_IDENTIFIER"));
        assert!(ids.contains(&"DANDI.EMPTY_FILE"));
    }

    #[test]
    fn hidden_files_are_warned_about() {
        let tmp = TempDir::new().unwrap();
        make_dandiset(tmp.path(), "000001");
        fs::write(tmp.path().join(".DS_Store"), b"junk").unwrap();

        let findings = validate_paths(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, "DANDI.HIDDEN_PATH");
        assert_eq!(findings[0].severity, Severity::Warning);
    }
}
