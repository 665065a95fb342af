//! Registration and execution of archive deletions.
//!
//! A [`Deleter`] accumulates deletion targets from mixed input forms
//! (URLs, local paths, whole Dandisets, folder prefixes), binds them all
//! to a single `(API endpoint, Dandiset)` session, deduplicates assets by
//! identifier, and executes the batch after an interactive confirmation.

mod execute;
mod local;

pub use execute::{AssetOutcome, AssetStatus, DebugSink, StatusSink, StatusUpdate, TableSink};
pub use local::find_local_asset;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use dandi_sdk::{
    Archive, Asset, AssetScope, Connect, DandiError, Dandiset, ParsedDandiUrl, parse_dandi_url,
};

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("cannot delete assets from multiple API instances at once")]
    MixedInstances,
    #[error("cannot delete assets from multiple Dandisets at once")]
    MixedDandisets,
    #[error("the archive does not support deletion of individual versions of a dandiset")]
    VersionedDandisetDeletion,
    #[error("asset at path {path:?} not found in Dandiset {dandiset_id}")]
    AssetNotFound { path: String, dandiset_id: String },
    #[error("no assets under path {prefix:?} found in Dandiset {dandiset_id}")]
    FolderNotFound { prefix: String, dandiset_id: String },
    #[error("no assets found for {url}")]
    UrlNotFound { url: String },
    #[error("found no dandiset.yaml anywhere; use 'dandi download' or 'organize' first")]
    NoDandisetRoot,
    #[error("whole-dandiset deletion was not registered")]
    DandisetNotRegistered,
    #[error(transparent)]
    Api(#[from] DandiError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What the Deleter has accumulated so far. Whole-dandiset mode supersedes
/// any asset-level targets, so the two never need reconciling.
#[derive(Clone, Debug)]
pub enum Plan {
    /// Delete this set of assets, unique by asset identifier
    Assets(Vec<Asset>),
    /// Delete the entire bound Dandiset
    WholeDandiset,
}

struct Session {
    client: Arc<dyn Archive>,
    dandiset: Dandiset,
}

/// Accumulates deletion targets against a single archive session and then
/// carries them out.
pub struct Deleter {
    connector: Arc<dyn Connect>,
    skip_missing: bool,
    session: Option<Session>,
    plan: Plan,
}

fn is_same_url(url1: &str, url2: &str) -> bool {
    url1.trim_end_matches('/') == url2.trim_end_matches('/')
}

impl Deleter {
    pub fn new(connector: Arc<dyn Connect>, skip_missing: bool) -> Self {
        Self {
            connector,
            skip_missing,
            session: None,
            plan: Plan::Assets(Vec::new()),
        }
    }

    /// True when nothing has been registered for deletion.
    pub fn is_empty(&self) -> bool {
        matches!(&self.plan, Plan::Assets(assets) if assets.is_empty())
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn dandiset(&self) -> Option<&Dandiset> {
        self.session.as_ref().map(|s| &s.dandiset)
    }

    /// The deduplicated asset list, in registration order. Empty in
    /// whole-dandiset mode.
    pub fn registered_assets(&self) -> &[Asset] {
        match &self.plan {
            Plan::Assets(assets) => assets,
            Plan::WholeDandiset => &[],
        }
    }

    /// Bind this Deleter to `(api_url, dandiset_id)`, connecting and
    /// fetching the dandiset fresh on first use. Returns `Ok(false)` when
    /// the Dandiset is missing and the skip-missing policy applies, in
    /// which case the caller must treat the registration as a no-op.
    /// Later calls verify the pair matches the bound session and leave all
    /// accumulated state untouched on mismatch.
    async fn bind(&mut self, api_url: &str, dandiset_id: &str) -> Result<bool, DeleteError> {
        match &self.session {
            None => {
                let api_url = api_url.trim_end_matches('/');
                let client = self.connector.connect(api_url).await?;
                match client.get_dandiset(dandiset_id).await {
                    Ok(dandiset) => {
                        tracing::debug!(dandiset_id, api_url, "bound deletion session");
                        self.session = Some(Session { client, dandiset });
                        Ok(true)
                    }
                    Err(DandiError::NotFound(_)) if self.skip_missing => Ok(false),
                    Err(e) => Err(e.into()),
                }
            }
            Some(session) => {
                if !is_same_url(session.client.api_url(), api_url) {
                    return Err(DeleteError::MixedInstances);
                }
                if session.dandiset.identifier != dandiset_id {
                    return Err(DeleteError::MixedDandisets);
                }
                Ok(true)
            }
        }
    }

    fn bound(&self) -> Option<(Arc<dyn Archive>, Dandiset)> {
        self.session
            .as_ref()
            .map(|s| (s.client.clone(), s.dandiset.clone()))
    }

    /// Append an asset unless one with the same identifier is already
    /// registered. The same asset is often reached twice, e.g. once by
    /// exact path and once through a prefix scan.
    fn add_asset(&mut self, asset: Asset) {
        if let Plan::Assets(assets) = &mut self.plan {
            if !assets.iter().any(|a| a.asset_id == asset.asset_id) {
                assets.push(asset);
            }
        }
    }

    /// Register the entire Dandiset for deletion.
    pub async fn register_dandiset(
        &mut self,
        api_url: &str,
        dandiset_id: &str,
    ) -> Result<(), DeleteError> {
        if self.bind(api_url, dandiset_id).await? {
            self.plan = Plan::WholeDandiset;
        }
        Ok(())
    }

    /// Register a single asset by its exact path.
    pub async fn register_asset(
        &mut self,
        api_url: &str,
        dandiset_id: &str,
        asset_path: &str,
    ) -> Result<(), DeleteError> {
        if !self.bind(api_url, dandiset_id).await? {
            return Ok(());
        }
        let Some((client, dandiset)) = self.bound() else {
            return Ok(());
        };
        match client.get_asset_by_path(&dandiset, asset_path).await {
            Ok(asset) => {
                self.add_asset(asset);
                Ok(())
            }
            Err(DandiError::NotFound(_)) if self.skip_missing => Ok(()),
            Err(DandiError::NotFound(_)) => Err(DeleteError::AssetNotFound {
                path: asset_path.to_string(),
                dandiset_id: dandiset_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Register every asset under a path prefix.
    pub async fn register_asset_folder(
        &mut self,
        api_url: &str,
        dandiset_id: &str,
        folder_path: &str,
    ) -> Result<(), DeleteError> {
        if !self.bind(api_url, dandiset_id).await? {
            return Ok(());
        }
        let Some((client, dandiset)) = self.bound() else {
            return Ok(());
        };
        let assets = client
            .get_assets_with_path_prefix(&dandiset, folder_path)
            .await?;
        if assets.is_empty() && !self.skip_missing {
            return Err(DeleteError::FolderNotFound {
                prefix: folder_path.to_string(),
                dandiset_id: dandiset_id.to_string(),
            });
        }
        for asset in assets {
            self.add_asset(asset);
        }
        Ok(())
    }

    /// Register every asset selected by an already-parsed asset-scope URL.
    /// The scope is enumerated against the draft version, the only version
    /// deletions operate on.
    pub async fn register_assets_url(
        &mut self,
        url: &str,
        parsed: &ParsedDandiUrl,
    ) -> Result<(), DeleteError> {
        if !self.bind(parsed.api_url(), parsed.dandiset_id()).await? {
            return Ok(());
        }
        let Some((client, dandiset)) = self.bound() else {
            return Ok(());
        };
        let assets = match parsed {
            ParsedDandiUrl::Assets { scope, .. } => match scope {
                AssetScope::Path(path) => {
                    match client.get_asset_by_path(&dandiset, path).await {
                        Ok(asset) => vec![asset],
                        Err(DandiError::NotFound(_)) => Vec::new(),
                        Err(e) => return Err(e.into()),
                    }
                }
                AssetScope::Folder(prefix) => {
                    client.get_assets_with_path_prefix(&dandiset, prefix).await?
                }
                AssetScope::Glob(pattern) => {
                    client.get_assets_by_glob(&dandiset, pattern).await?
                }
            },
            ParsedDandiUrl::Dandiset { .. } => Vec::new(),
        };
        if assets.is_empty() && !self.skip_missing {
            return Err(DeleteError::UrlNotFound {
                url: url.to_string(),
            });
        }
        for asset in assets {
            self.add_asset(asset);
        }
        Ok(())
    }

    /// Register whatever a user-supplied URL denotes. Version-scoped
    /// dandiset deletion is rejected; asset scopes default to the draft
    /// version.
    pub async fn register_url(&mut self, url: &str) -> Result<(), DeleteError> {
        let parsed = parse_dandi_url(url)?;
        match &parsed {
            ParsedDandiUrl::Dandiset {
                version_id: Some(_),
                ..
            } => Err(DeleteError::VersionedDandisetDeletion),
            ParsedDandiUrl::Dandiset {
                api_url,
                dandiset_id,
                ..
            } => {
                let (api_url, dandiset_id) = (api_url.clone(), dandiset_id.clone());
                self.register_dandiset(&api_url, &dandiset_id).await
            }
            ParsedDandiUrl::Assets { .. } => self.register_assets_url(url, &parsed).await,
        }
    }

    /// Register the remote equivalent of a local filesystem path.
    pub async fn register_local_path(
        &mut self,
        api_url: &str,
        filepath: &Path,
    ) -> Result<(), DeleteError> {
        let (dandiset_id, asset_path) = find_local_asset(filepath)?;
        if asset_path.ends_with('/') {
            self.register_asset_folder(api_url, &dandiset_id, &asset_path)
                .await
        } else {
            self.register_asset(api_url, &dandiset_id, &asset_path).await
        }
    }

    /// The question to put to the user before executing, or `None` when
    /// there is nothing to delete.
    pub fn confirmation_message(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let id = &session.dandiset.identifier;
        match &self.plan {
            Plan::WholeDandiset => Some(format!("Delete Dandiset {id}?")),
            Plan::Assets(assets) if !assets.is_empty() => Some(format!(
                "Delete {} assets on server from Dandiset {id}?",
                assets.len()
            )),
            Plan::Assets(_) => None,
        }
    }

    /// Delete the whole bound Dandiset. A failure here is fatal; there is
    /// exactly one target, so no isolation applies.
    pub async fn delete_dandiset(&self) -> Result<(), DeleteError> {
        match (&self.plan, &self.session) {
            (Plan::WholeDandiset, Some(session)) => {
                session.client.delete_dandiset(&session.dandiset).await?;
                Ok(())
            }
            _ => Err(DeleteError::DandisetNotRegistered),
        }
    }

    /// Delete the registered assets in path-sorted order over at most
    /// `jobs` concurrent requests. Per-asset failures are captured in the
    /// returned outcomes; the batch always runs to completion.
    pub async fn process_assets(&self, jobs: usize, sink: &dyn StatusSink) -> Vec<AssetOutcome> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let Plan::Assets(assets) = &self.plan else {
            return Vec::new();
        };
        execute::run_assets(
            session.client.clone(),
            &session.dandiset,
            assets.clone(),
            jobs,
            sink,
        )
        .await
    }
}

/// Interactive yes/no gate in front of destructive calls.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

/// Reads the answer from stdin; anything but `y`/`Y` declines.
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        eprint!("{message} [y/N] ");
        io::stderr().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}

/// Options of one `dandi delete` invocation.
pub struct DeleteOptions {
    /// API endpoint used for local-path targets
    pub instance_api_url: String,
    /// Serial execution with every status transition printed
    pub devel_debug: bool,
    /// Upper bound on concurrent delete requests
    pub jobs: usize,
    /// Skip the confirmation gate
    pub force: bool,
    /// Turn not-found targets into no-ops instead of fatal errors
    pub skip_missing: bool,
}

pub fn is_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("dandi:")
}

/// Drive one deletion batch end to end: register every input, confirm,
/// execute, report.
pub async fn run_delete(
    paths: &[String],
    options: &DeleteOptions,
    connector: Arc<dyn Connect>,
    prompt: &mut dyn ConfirmPrompt,
) -> Result<(), DeleteError> {
    let mut deleter = Deleter::new(connector, options.skip_missing);
    for path in paths {
        if is_url(path) {
            deleter.register_url(path).await?;
        } else {
            deleter
                .register_local_path(&options.instance_api_url, Path::new(path))
                .await?;
        }
    }
    if deleter.is_empty() {
        tracing::info!("nothing to delete");
        return Ok(());
    }
    if !options.force {
        let Some(message) = deleter.confirmation_message() else {
            return Ok(());
        };
        if !prompt.confirm(&message)? {
            tracing::info!("deletion declined");
            return Ok(());
        }
    }
    match deleter.plan() {
        Plan::WholeDandiset => {
            deleter.delete_dandiset().await?;
            if let Some(dandiset) = deleter.dandiset() {
                println!("Dandiset {} deleted.", dandiset.identifier);
            }
        }
        Plan::Assets(_) => {
            let outcomes = if options.devel_debug {
                deleter.process_assets(1, &DebugSink).await
            } else {
                let table = TableSink::new(deleter.registered_assets());
                table.print_header();
                deleter.process_assets(options.jobs, &table).await
            };
            let errors = outcomes
                .iter()
                .filter(|o| o.status == AssetStatus::Error)
                .count();
            println!("{} deleted, {errors} failed", outcomes.len() - errors);
        }
    }
    Ok(())
}
