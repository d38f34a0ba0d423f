use std::path::PathBuf;

use clap::Subcommand;

/// Source configuration.
#[derive(Clone, Debug, Subcommand)]
pub enum SourcesCommands {
    /// Show the active sources.
    List {
        /// Include disabled sources and endpoints.
        #[arg(long)]
        all: bool,
    },
    /// Preview the shared store's snapshot without adopting it.
    Shared,
    /// Replace the local snapshot with a JSON array of source records.
    Commit {
        /// Path to the JSON file.
        file: PathBuf,
        /// Also write the snapshot to the shared store.
        #[arg(long)]
        sync_shared: bool,
    },
}
