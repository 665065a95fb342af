use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One version of a Dandiset, as reported by the API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Version {
    /// Version identifier, "draft" or a published version string
    pub version: String,
    pub name: Option<String>,
    #[serde(default)]
    pub asset_count: u64,
    #[serde(default)]
    pub size: u64,
}

/// A Dandiset bound to one of its versions. Deletion always operates
/// against the draft version.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Dandiset {
    pub identifier: String,
    pub version: Version,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl Dandiset {
    pub fn version_id(&self) -> &str {
        &self.version.version
    }
}

/// A single file-like object within a Dandiset version.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    /// Stable identifier of the remote object; the deduplication key
    pub asset_id: String,
    /// POSIX-style path relative to the Dandiset root
    pub path: String,
    #[serde(default)]
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}
