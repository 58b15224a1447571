//! Export command implementation

use super::CommandContext;
use crate::cli::ExportArgs;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output_types::ExportOutput;
use anyhow::{Context, Result};
use chrono::Utc;
use geojson::GeoJson;
use ifn_core::models::StatusFilter;
use ifn_geo::export::units_to_geojson;

pub async fn execute(args: ExportArgs, ctx: &CommandContext) -> Result<()> {
    let filter = StatusFilter::parse_lenient(&args.status);
    let board = ctx.load_board(filter).await?;
    let units = board.visible();
    let path = args.output.display().to_string();

    if ctx.dry_run {
        let action = PlannedAction::new(ActionType::WriteFile, format!("Write {}", path))
            .with_detail(format!("Features: {}", units.len()))
            .with_detail(format!("Filter: {}", filter));
        return display_planned_actions(&ctx.output, &[action]);
    }

    let collection = units_to_geojson(&units);
    let features = collection.features.len();
    let geojson = GeoJson::FeatureCollection(collection);

    std::fs::write(&args.output, geojson.to_string())
        .with_context(|| format!("Failed to write {}", path))?;
    tracing::info!("Exported {} conglomerados to {}", features, path);

    let exported = ExportOutput { path, features, exported_at: Utc::now() };
    if ctx.output.is_json() {
        return ctx.output.result(exported);
    }

    ctx.output.success(format!("Exported {} conglomerados to {}", exported.features, exported.path));
    Ok(())
}
