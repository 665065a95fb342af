mod archive;
mod client;
mod error;
mod types;
pub mod url;

pub use archive::{Archive, Connect};
pub use client::{DandiClient, DandiConnector};
pub use error::DandiError;
pub use types::{Asset, Dandiset, Version};
pub use self::url::{AssetScope, ParsedDandiUrl, parse_dandi_url};

#[cfg(feature = "testing")]
pub use archive::{MockArchive, MockConnect};

/// Version identifier of the mutable head of a Dandiset.
pub const DRAFT: &str = "draft";
