use trawl_core::ListingPage;

use crate::cli::root_commands::ListArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{ItemRow, notice, output};

/// Handle `trawl list`.
pub async fn handle(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let page = ctx.catalog.list(&args.source, args.page).await?;
    render_page(&page, flags)
}

/// Shared by `list` and `detail`: full page as JSON, item rows as a table.
pub fn render_page(page: &ListingPage, flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format != OutputFormat::Table {
        return output(page, flags.format);
    }

    if let Some(error) = &page.error {
        notice(&format!("{} unavailable: {error}", page.source_name));
    }
    let rows = page.items.iter().map(ItemRow::from).collect::<Vec<_>>();
    output(&rows, flags.format)?;
    notice(&format!(
        "page {}/{} from {}",
        page.pagination.page, page.pagination.page_count, page.source_name
    ));
    Ok(())
}
