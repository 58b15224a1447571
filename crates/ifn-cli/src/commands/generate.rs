//! Generate command implementation

use super::CommandContext;
use crate::cli::GenerateArgs;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output_types::GenerateOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use dialoguer::Confirm;
use ifn_core::error::IfnError;
use ifn_review::{plan, GenerationOutcome, GenerationRequestController};

pub async fn execute(args: GenerateArgs, ctx: &CommandContext) -> Result<()> {
    let plan = plan(args.count).map_err(IfnError::from)?;

    if ctx.dry_run {
        let action = PlannedAction::new(
            ActionType::GenerateUnits,
            format!("Generate {} conglomerados", plan.count),
        )
        .with_detail(format!("Subparcelas: {}", plan.subparcels))
        .with_detail("Placement: chosen by the service");
        return display_planned_actions(&ctx.output, &[action]);
    }

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Generate {} conglomerados with {} subparcelas?",
                plan.count, plan.subparcels
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Generation cancelled");
            return Ok(());
        }
    }

    let controller = GenerationRequestController::new(ctx.backend.service.clone());
    let outcome = with_spinner(
        ctx.output.is_json(),
        &format!("Generating {} conglomerados...", plan.count),
        "Generation finished",
        controller.request(plan.count),
    )
    .await?;

    let result = match outcome {
        GenerationOutcome::Generated(result) => result,
        GenerationOutcome::AlreadyInFlight => {
            ctx.output.warning("A generation request is already running");
            return Ok(());
        }
    };

    let output = GenerateOutput {
        requested: result.requested,
        created: result.units_created(),
        subparcels: result.subparcel_count(),
        codes: result.units.iter().map(|u| u.code.clone()).collect(),
        outside_extent: result.outside_extent.iter().map(|id| id.to_string()).collect(),
    };

    if !output.outside_extent.is_empty() {
        ctx.output.warning(format!(
            "{} conglomerados lie outside the national extent: {}",
            output.outside_extent.len(),
            output.outside_extent.join(", ")
        ));
    }

    if ctx.output.is_json() {
        return ctx.output.result(output);
    }

    ctx.output.success(format!(
        "Created {} conglomerados and {} subparcelas",
        output.created, output.subparcels
    ));
    if output.created != output.requested as usize {
        ctx.output.warning(format!(
            "Requested {}, the service created {}",
            output.requested, output.created
        ));
    }
    for code in &output.codes {
        ctx.output.info(code);
    }
    Ok(())
}
