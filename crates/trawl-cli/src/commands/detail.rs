use crate::cli::GlobalFlags;
use crate::cli::root_commands::DetailArgs;
use crate::commands::list::render_page;
use crate::context::AppContext;

/// Handle `trawl detail`.
pub async fn handle(args: &DetailArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let page = ctx.catalog.detail(&args.source, &args.ids).await?;
    render_page(&page, flags)
}
