use anyhow::Context;
use serde::Serialize;
use trawl_core::{SnapshotOrigin, SourceSnapshot, SourceSummary, SourceView};
use trawl_registry::RegistryError;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SourcesCommands;
use crate::context::AppContext;
use crate::output::{notice, output};

#[derive(Debug, Serialize)]
struct SharedPreview {
    configured: bool,
    found: bool,
    sources: Vec<SourceSummary>,
}

#[derive(Debug, Serialize)]
struct CommitResponse {
    path: String,
    sources: usize,
    synced_to_shared: bool,
}

/// Handle `trawl sources ...`.
pub async fn handle(
    action: &SourcesCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SourcesCommands::List { all } => {
            let view = if *all { SourceView::Full } else { SourceView::Public };
            let sources = ctx.catalog.sources(view).await?;
            output(&sources, flags.format)
        }
        SourcesCommands::Shared => {
            let registry = ctx.catalog.registry();
            let snapshot = registry
                .fetch_shared()
                .await
                .context("failed to read shared source snapshot")?;
            let preview = SharedPreview {
                configured: registry.has_shared_store(),
                found: snapshot.is_some(),
                sources: snapshot.map_or_else(Vec::new, |s| s.view(SourceView::Full)),
            };
            output(&preview, flags.format)
        }
        SourcesCommands::Commit { file, sync_shared } => {
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let snapshot = SourceSnapshot::decode(&bytes, SnapshotOrigin::Local)
                .with_context(|| format!("{} is not a valid source list", file.display()))?;
            if !snapshot.sources().iter().any(|source| source.is_dispatchable()) {
                notice("warning: no source in this snapshot is enabled with a usable endpoint");
            }

            let path = ctx.config.storage.sources_path().display().to_string();
            let committed = match ctx.catalog.registry().commit(snapshot, *sync_shared).await {
                Ok(committed) => committed,
                Err(error @ (RegistryError::SharedUnavailable | RegistryError::SharedStore(_))) => {
                    return Err(anyhow::Error::new(error)
                        .context(format!("saved {path}, but shared store sync failed")));
                }
                Err(error) => return Err(error).context("failed to commit source snapshot"),
            };

            output(
                &CommitResponse {
                    path,
                    sources: committed.len(),
                    synced_to_shared: *sync_shared,
                },
                flags.format,
            )
        }
    }
}
