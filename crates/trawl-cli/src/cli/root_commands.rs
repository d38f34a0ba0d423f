use clap::{Args, Subcommand};

use crate::cli::subcommands::SourcesCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Inspect and replace the source configuration.
    Sources {
        #[command(subcommand)]
        action: SourcesCommands,
    },
    /// One page of a single source's listing.
    List(ListArgs),
    /// Full records for specific ids from one source.
    Detail(DetailArgs),
    /// Search every enabled source at once.
    Search(SearchArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Source key.
    pub source: String,
    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Clone, Debug, Args)]
pub struct DetailArgs {
    /// Source key.
    pub source: String,
    /// Native ids, comma-separated.
    #[arg(value_delimiter = ',', required = true)]
    pub ids: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SearchArgs {
    /// Keyword to search for.
    pub keyword: String,
    /// Restrict to these source keys (repeatable). Defaults to all enabled sources.
    #[arg(long = "source")]
    pub sources: Vec<String>,
    /// Max items per source (overrides search.per_source_cap).
    #[arg(long)]
    pub cap: Option<usize>,
    /// Per-attempt timeout per source in ms (overrides search.per_source_timeout_ms).
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Cancel the whole search after this many ms.
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}
