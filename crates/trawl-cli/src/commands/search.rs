use std::time::Duration;

use anyhow::bail;
use serde::Serialize;
use trawl_core::{FanoutResult, OutcomeSummary, SearchQuery, SourceGroup, SourceSelection};
use trawl_fanout::FanoutSlot;

use crate::cli::root_commands::SearchArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{ItemRow, notice, output};
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct SearchResponse<'a> {
    keyword: &'a str,
    sources: usize,
    unavailable: usize,
    items: usize,
    outcomes: Vec<OutcomeSummary>,
    groups: &'a [SourceGroup],
}

#[derive(Debug, Serialize)]
struct GroupedRow {
    source: String,
    #[serde(flatten)]
    item: ItemRow,
}

/// Handle `trawl search`.
pub async fn handle(args: &SearchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let query = apply_args(ctx.catalog.search_query(args.keyword.as_str()), args);
    let progress = Progress::sources(&args.keyword);
    let search = ctx
        .catalog
        .search(&ctx.slot, &query, |completed, total| progress.update(completed, total));

    let result = match race_deadline(
        search,
        &ctx.slot,
        args.deadline_ms.map(Duration::from_millis),
        &args.keyword,
    )
    .await
    {
        Ok(result) => result,
        Err(error) => {
            progress.finish_err("cancelled");
            return Err(error);
        }
    };

    let result = match result {
        Ok(Some(result)) => result,
        Ok(None) => {
            progress.finish_err("cancelled");
            bail!("search for '{}' was cancelled", args.keyword);
        }
        Err(error) => {
            progress.finish_err("failed");
            return Err(error.into());
        }
    };
    progress.finish_clear();

    render(&result, flags)
}

/// Run `search` to completion, or until `deadline` elapses. On expiry the
/// slot's live job is cancelled and the search is reported as cancelled.
async fn race_deadline<F, T>(
    search: F,
    slot: &FanoutSlot,
    deadline: Option<Duration>,
    keyword: &str,
) -> anyhow::Result<T>
where
    F: Future<Output = T>,
{
    let Some(deadline) = deadline else {
        return Ok(search.await);
    };
    if let Ok(result) = tokio::time::timeout(deadline, search).await {
        return Ok(result);
    }
    if let Some(job) = slot.cancel_current() {
        tracing::debug!(%job, "search deadline reached");
    }
    bail!(
        "search for '{keyword}' cancelled after {} ms deadline",
        deadline.as_millis()
    )
}

/// Overlay CLI options on the configured query defaults.
fn apply_args(mut query: SearchQuery, args: &SearchArgs) -> SearchQuery {
    if !args.sources.is_empty() {
        query = query.with_selection(SourceSelection::keys(&args.sources));
    }
    if let Some(cap) = args.cap {
        query = query.with_cap(Some(cap));
    }
    if let Some(timeout_ms) = args.timeout_ms {
        query = query.with_timeout(Duration::from_millis(timeout_ms));
    }
    query
}

fn render(result: &FanoutResult, flags: &GlobalFlags) -> anyhow::Result<()> {
    let unavailable = result.unavailable();

    if flags.format == OutputFormat::Table {
        let rows = result
            .groups
            .iter()
            .flat_map(|group| {
                group.items.iter().map(|item| GroupedRow {
                    source: group.source_name.clone(),
                    item: ItemRow::from(item),
                })
            })
            .collect::<Vec<_>>();
        output(&rows, flags.format)?;
        output(&result.summaries(), flags.format)?;
    } else {
        output(
            &SearchResponse {
                keyword: &result.keyword,
                sources: result.total(),
                unavailable,
                items: result.item_count(),
                outcomes: result.summaries(),
                groups: &result.groups,
            },
            flags.format,
        )?;
    }

    if unavailable > 0 {
        notice(&format!("{unavailable} of {} sources unavailable", result.total()));
    }
    Ok(())
}
