use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use common::Config;
use dandi_sdk::DandiConnector;

use crate::delete::{DeleteOptions, StdinPrompt, run_delete};

#[derive(Args)]
pub struct DeleteArgs {
    /// Paths or URLs of the assets and/or Dandisets to delete
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<String>,

    /// Archive instance to interact with for local paths
    #[arg(short = 'i', long, default_value = "dandi", value_name = "INSTANCE")]
    dandi_instance: String,

    /// Run deletions serially and print every status transition
    #[arg(long)]
    devel_debug: bool,

    /// Number of parallel delete requests
    #[arg(short = 'J', long, default_value_t = 6, value_name = "N")]
    jobs: usize,

    /// Delete without requesting confirmation
    #[arg(long)]
    force: bool,

    /// Treat missing assets and Dandisets as no-ops instead of errors
    #[arg(long)]
    skip_missing: bool,
}

impl DeleteArgs {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let instance = config
            .get_instance(&self.dandi_instance)
            .with_context(|| format!("instance {:?} is not configured", self.dandi_instance))?;
        let options = DeleteOptions {
            instance_api_url: instance.api.clone(),
            devel_debug: self.devel_debug,
            jobs: self.jobs,
            force: self.force,
            skip_missing: self.skip_missing,
        };
        let connector = Arc::new(DandiConnector::new(config.api_key()));
        run_delete(&self.paths, &options, connector, &mut StdinPrompt).await?;
        Ok(())
    }
}
