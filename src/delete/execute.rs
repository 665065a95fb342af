//! Per-asset deletion execution with failure isolation.
//!
//! Every asset goes through one status-event producer yielding
//! `Deleting` and then either `Deleted` or `Error`; the sinks only differ
//! in how they surface those events.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use futures::stream::{Stream, StreamExt};
use serde::Serialize;

use dandi_sdk::{Archive, Asset, Dandiset};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AssetStatus {
    Deleting,
    Deleted,
    Error,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetStatus::Deleting => write!(f, "Deleting"),
            AssetStatus::Deleted => write!(f, "Deleted"),
            AssetStatus::Error => write!(f, "Error"),
        }
    }
}

/// One status transition of one asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub path: String,
    pub status: AssetStatus,
    pub message: Option<String>,
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {} ({message})", self.path, self.status),
            None => write!(f, "{}: {}", self.path, self.status),
        }
    }
}

/// Terminal state of one asset after the batch has run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetOutcome {
    pub path: String,
    pub status: AssetStatus,
    pub message: Option<String>,
}

/// Consumer of status transitions. Implementations must tolerate
/// interleaved updates for different paths; updates for one path always
/// arrive in order.
pub trait StatusSink: Send + Sync {
    fn update(&self, update: &StatusUpdate);
}

/// Prints every transition as it happens. Meant for serial troubleshooting
/// runs, where the output is fully ordered.
pub struct DebugSink;

impl StatusSink for DebugSink {
    fn update(&self, update: &StatusUpdate) {
        println!("{update}");
    }
}

/// Prints one aligned row per asset once it reaches a terminal state.
pub struct TableSink {
    path_width: usize,
}

impl TableSink {
    pub fn new(assets: &[Asset]) -> Self {
        let path_width = assets
            .iter()
            .map(|a| a.path.len())
            .max()
            .unwrap_or(0)
            .max("PATH".len());
        Self { path_width }
    }

    pub fn print_header(&self) {
        println!("{:<width$}  {:<8}  MESSAGE", "PATH", "STATUS", width = self.path_width);
        let _ = std::io::stdout().flush();
    }
}

impl StatusSink for TableSink {
    fn update(&self, update: &StatusUpdate) {
        if update.status == AssetStatus::Deleting {
            return;
        }
        println!(
            "{:<width$}  {:<8}  {}",
            update.path,
            update.status.to_string(),
            update.message.as_deref().unwrap_or(""),
            width = self.path_width
        );
    }
}

/// The status-event producer for a single asset: `Deleting`, then the
/// terminal state. A failed delete is captured into the event, never
/// propagated, so one asset's failure cannot abort its siblings.
fn asset_events<'a>(
    client: &'a dyn Archive,
    dandiset: &'a Dandiset,
    asset: &'a Asset,
) -> impl Stream<Item = StatusUpdate> + 'a {
    async_stream::stream! {
        yield StatusUpdate {
            path: asset.path.clone(),
            status: AssetStatus::Deleting,
            message: None,
        };
        match client.delete_asset(dandiset, &asset.asset_id).await {
            Ok(()) => yield StatusUpdate {
                path: asset.path.clone(),
                status: AssetStatus::Deleted,
                message: None,
            },
            Err(e) => yield StatusUpdate {
                path: asset.path.clone(),
                status: AssetStatus::Error,
                message: Some(format!("{}: {e}", e.kind())),
            },
        }
    }
}

/// Delete `assets` in path-sorted submission order over a pool of at most
/// `jobs` concurrent requests, forwarding every transition to `sink`.
pub(crate) async fn run_assets(
    client: Arc<dyn Archive>,
    dandiset: &Dandiset,
    mut assets: Vec<Asset>,
    jobs: usize,
    sink: &dyn StatusSink,
) -> Vec<AssetOutcome> {
    assets.sort_by(|a, b| a.path.cmp(&b.path));
    futures::stream::iter(assets.into_iter().map(|asset| {
        let client = client.clone();
        async move {
            let mut outcome = AssetOutcome {
                path: asset.path.clone(),
                status: AssetStatus::Deleting,
                message: None,
            };
            let events = asset_events(client.as_ref(), dandiset, &asset);
            futures::pin_mut!(events);
            while let Some(update) = events.next().await {
                sink.update(&update);
                outcome.status = update.status;
                outcome.message = update.message;
            }
            outcome
        }
    }))
    .buffer_unordered(jobs.max(1))
    .collect()
    .await
}
