use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use crate::validate::{Severity, validate_paths};

#[derive(Args)]
pub struct ValidateArgs {
    /// Files or directories to validate
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Only report findings of this severity or higher
    #[arg(long, value_parser = parse_severity, default_value = "hint")]
    min_severity: Severity,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    match s.to_ascii_lowercase().as_str() {
        "hint" => Ok(Severity::Hint),
        "warning" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => Err(format!("invalid severity: {other:?}")),
    }
}

impl ValidateArgs {
    pub fn run(self) -> anyhow::Result<()> {
        let findings = validate_paths(&self.paths)?;
        let mut errors = 0usize;
        for finding in &findings {
            if finding.severity < self.min_severity {
                continue;
            }
            if finding.severity == Severity::Error {
                errors += 1;
            }
            let scope = finding
                .scope()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<dataset>".to_string());
            println!(
                "{}: [{}] {} -- {}",
                scope, finding.severity, finding.id, finding.message
            );
        }
        if errors > 0 {
            bail!("{errors} validation error(s)");
        }
        println!("No errors found.");
        Ok(())
    }
}
