use anyhow::Context;
use trawl_config::TrawlConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, layered config and CLI overrides, then validate.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<TrawlConfig> {
    let mut config = TrawlConfig::load_with_dotenv().context("failed to load trawl configuration")?;
    apply_overrides(&mut config, flags);
    config.validate().context("invalid trawl configuration")?;
    Ok(config)
}

fn apply_overrides(config: &mut TrawlConfig, flags: &GlobalFlags) {
    if let Some(data_dir) = &flags.data_dir {
        tracing::debug!(data_dir = %data_dir.display(), "overriding storage.data_dir");
        config.storage.data_dir.clone_from(data_dir);
    }
}
