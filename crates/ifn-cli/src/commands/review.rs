//! Interactive review command

use super::CommandContext;
use crate::cli::ReviewArgs;
use crate::interactive::review_loop;
use anyhow::Result;
use ifn_core::models::StatusFilter;

pub async fn execute(args: ReviewArgs, ctx: &CommandContext) -> Result<()> {
    if ctx.output.is_json() {
        anyhow::bail!("The review console is interactive and cannot emit JSON");
    }

    let filter = StatusFilter::parse_lenient(&args.status);
    let mut board = ctx.load_board(filter).await?;
    if let Some(search) = args.search.as_deref() {
        board.set_search(search);
    }

    review_loop(&mut board, &ctx.output).await
}
