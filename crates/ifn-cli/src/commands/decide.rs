//! Approve and reject commands

use super::CommandContext;
use crate::backend::Board;
use crate::cli::{ApproveArgs, RejectArgs};
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output_types::DecisionOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use ifn_core::error::IfnError;
use ifn_core::models::{RegionId, StatusFilter, UnitId};
use ifn_review::{CommitOutcome, DecisionDraft};

pub async fn approve(args: ApproveArgs, ctx: &CommandContext) -> Result<()> {
    let mut board = ctx.load_board(StatusFilter::All).await?;
    let unit = ctx.find_unit(&board, &args.code)?;
    let region = RegionId::from(args.region.trim());

    if ctx.dry_run {
        unit.ensure_pending()?;
        DecisionDraft::Approve { region: Some(region.clone()) }.validate().map_err(IfnError::from)?;
        let name = board
            .regions()
            .iter()
            .find(|r| r.id == region)
            .map(|r| r.label())
            .unwrap_or_else(|| format!("{} (not in the departamento list)", region));
        let action = PlannedAction::new(ActionType::ApproveUnit, format!("Approve {}", unit.code))
            .with_detail(format!("Departamento: {}", name))
            .with_detail(format!("Asignado por: {}", ctx.backend.session.actor()?.id));
        return display_planned_actions(&ctx.output, &[action]);
    }

    let outcome = with_spinner(
        ctx.output.is_json(),
        &format!("Approving {}...", unit.code),
        &format!("Approved {}", unit.code),
        board.approve(&unit.id, &region),
    )
    .await?;

    report(ctx, &board, &unit.code, &unit.id, outcome)
}

pub async fn reject(args: RejectArgs, ctx: &CommandContext) -> Result<()> {
    let mut board = ctx.load_board(StatusFilter::All).await?;
    let unit = ctx.find_unit(&board, &args.code)?;

    if ctx.dry_run {
        unit.ensure_pending()?;
        DecisionDraft::Reject { reason: args.reason.clone() }.validate().map_err(IfnError::from)?;
        let action = PlannedAction::new(ActionType::RejectUnit, format!("Reject {}", unit.code))
            .with_detail(format!("Razón: {}", args.reason.trim()))
            .with_detail(format!("Asignado por: {}", ctx.backend.session.actor()?.id));
        return display_planned_actions(&ctx.output, &[action]);
    }

    let outcome = with_spinner(
        ctx.output.is_json(),
        &format!("Rejecting {}...", unit.code),
        &format!("Rejected {}", unit.code),
        board.reject(&unit.id, &args.reason),
    )
    .await?;

    report(ctx, &board, &unit.code, &unit.id, outcome)
}

fn report(
    ctx: &CommandContext,
    board: &Board,
    code: &str,
    id: &UnitId,
    outcome: CommitOutcome,
) -> Result<()> {
    if !board.is_consistent() {
        ctx.output.warning("The decision was saved but the list could not be reloaded");
    }

    if ctx.output.is_json() {
        return ctx.output.result(DecisionOutput {
            code: code.to_string(),
            outcome,
            unit: board.unit(id).cloned(),
            consistent: board.is_consistent(),
        });
    }

    match (outcome, board.unit(id)) {
        (CommitOutcome::Committed, Some(unit)) => {
            let display = unit.status().display();
            ctx.output.kv(code, ctx.output.badge(display.label, display.badge));
        }
        (CommitOutcome::Committed, None) => {}
        (CommitOutcome::AlreadyInFlight, _) => {
            ctx.output.info(format!("A decision on {} is already being sent", code))
        }
        (CommitOutcome::Dismissed, _) => {
            ctx.output.info(format!("Decision on {} saved; reload to see it", code))
        }
    }
    Ok(())
}
