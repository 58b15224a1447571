//! Locate command implementation

use super::CommandContext;
use crate::cli::CodeArgs;
use crate::output_types::LocateOutput;
use anyhow::Result;
use ifn_core::models::StatusFilter;
use std::time::Instant;

pub async fn execute(args: CodeArgs, ctx: &CommandContext) -> Result<()> {
    let mut board = ctx.load_board(StatusFilter::All).await?;
    let unit = ctx.find_unit(&board, &args.code)?;

    let now = Instant::now();
    board.select(&unit.id, now)?;

    // The headless map settles immediately once asked to
    let events = board.selection_mut().map_mut().finish_animations();
    for event in events {
        board.handle_map_event(event, now)?;
    }

    let map = board.selection().map();
    let located = LocateOutput {
        code: unit.code.clone(),
        viewport: map.viewport(),
        overlay: map.overlay().cloned(),
    };

    if ctx.output.is_json() {
        return ctx.output.result(located);
    }

    ctx.output.section(format!("Map focused on {}", located.code));
    ctx.output.kv("Center", located.viewport.center);
    ctx.output.kv("Zoom", located.viewport.zoom);
    if let Some(overlay) = &located.overlay {
        ctx.output.section(&overlay.title);
        for line in &overlay.lines {
            ctx.output.info(line);
        }
    }
    Ok(())
}
