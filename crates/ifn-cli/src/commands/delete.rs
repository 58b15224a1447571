//! Delete command implementation

use super::CommandContext;
use crate::cli::DeleteArgs;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::progress::with_spinner;
use anyhow::Result;
use dialoguer::Confirm;
use ifn_core::models::StatusFilter;

pub async fn execute(args: DeleteArgs, ctx: &CommandContext) -> Result<()> {
    let mut board = ctx.load_board(StatusFilter::All).await?;
    let unit = ctx.find_unit(&board, &args.code)?;

    if ctx.dry_run {
        let action = PlannedAction::new(ActionType::DeleteUnit, format!("Delete {}", unit.code))
            .with_detail(format!("Estado: {}", unit.status().display().label))
            .with_detail(format!("Coordenadas: {}", unit.coordinates()));
        return display_planned_actions(&ctx.output, &[action]);
    }

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete conglomerado {}? This cannot be undone", unit.code))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Deletion cancelled");
            return Ok(());
        }
    }

    with_spinner(
        ctx.output.is_json(),
        &format!("Deleting {}...", unit.code),
        &format!("Deleted {}", unit.code),
        board.delete(&unit.id),
    )
    .await?;

    if !board.is_consistent() {
        ctx.output.warning("The conglomerado was deleted but the list could not be reloaded");
    }

    ctx.output.result(serde_json::json!({
        "code": unit.code,
        "deleted": true,
        "remaining": board.units().len(),
    }))
}
