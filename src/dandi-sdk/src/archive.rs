use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DandiError;
use crate::types::{Asset, Dandiset};

/// Operations the deletion engine needs from an archive bound to one API
/// endpoint. `DandiClient` is the production implementation; tests run
/// against the generated mock.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait Archive: Send + Sync {
    /// Base URL of the API endpoint this client talks to.
    fn api_url(&self) -> &str;

    /// Fetch the Dandiset fresh from the server, bound to its draft version.
    async fn get_dandiset(&self, dandiset_id: &str) -> Result<Dandiset, DandiError>;

    /// Fetch the asset whose path equals `path` exactly.
    async fn get_asset_by_path(
        &self,
        dandiset: &Dandiset,
        path: &str,
    ) -> Result<Asset, DandiError>;

    /// All assets whose paths start with `prefix`; possibly empty.
    async fn get_assets_with_path_prefix(
        &self,
        dandiset: &Dandiset,
        prefix: &str,
    ) -> Result<Vec<Asset>, DandiError>;

    /// All assets whose paths match the glob `pattern`; possibly empty.
    async fn get_assets_by_glob(
        &self,
        dandiset: &Dandiset,
        pattern: &str,
    ) -> Result<Vec<Asset>, DandiError>;

    async fn delete_asset(&self, dandiset: &Dandiset, asset_id: &str) -> Result<(), DandiError>;

    async fn delete_dandiset(&self, dandiset: &Dandiset) -> Result<(), DandiError>;

    /// Create a new Dandiset with the given name and raw metadata.
    async fn create_dandiset(
        &self,
        name: &str,
        metadata: serde_json::Value,
    ) -> Result<Dandiset, DandiError>;
}

/// Factory that authenticates against an API endpoint and yields a bound
/// [`Archive`]. Separated from the client so that session binding can be
/// exercised without network access.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self, api_url: &str) -> Result<Arc<dyn Archive>, DandiError>;
}
