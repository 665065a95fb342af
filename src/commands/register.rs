use anyhow::Context;
use clap::Args;

use common::Config;
use dandi_sdk::{Archive as _, Connect, DandiConnector};

#[derive(Args)]
pub struct RegisterArgs {
    /// Name of the Dandiset to create
    name: String,

    /// Description recorded in the Dandiset metadata
    #[arg(short = 'D', long, default_value = "")]
    description: String,

    /// Archive instance to create the Dandiset on
    #[arg(short = 'i', long, default_value = "dandi", value_name = "INSTANCE")]
    dandi_instance: String,
}

impl RegisterArgs {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let instance = config
            .get_instance(&self.dandi_instance)
            .with_context(|| format!("instance {:?} is not configured", self.dandi_instance))?;
        let connector = DandiConnector::new(config.api_key());
        let client = connector.connect(&instance.api).await?;
        let metadata = serde_json::json!({
            "name": self.name,
            "description": self.description,
        });
        let dandiset = client.create_dandiset(&self.name, metadata).await?;
        println!("Dandiset {} created", dandiset.identifier);
        if let Some(gui) = &instance.gui {
            println!("{gui}/dandiset/{}/draft", dandiset.identifier);
        }
        Ok(())
    }
}
