//! List, regions and show commands

use super::CommandContext;
use crate::cli::{CodeArgs, ListArgs};
use crate::output_types::{ListOutput, RegionRow, UnitRow};
use anyhow::Result;
use ifn_core::models::{ReviewState, StatusFilter};

pub async fn execute(args: ListArgs, ctx: &CommandContext) -> Result<()> {
    let filter = StatusFilter::parse_lenient(&args.status);
    let search = args.search.unwrap_or_default();

    let mut board = ctx.load_board(filter).await?;
    board.set_search(&search);
    let units = board.visible();

    if ctx.output.is_json() {
        return ctx.output.result(ListOutput {
            status_filter: filter.to_string(),
            search,
            count: units.len(),
            units,
        });
    }

    ctx.output.section(format!("Conglomerados ({}): {}", filter, units.len()));
    ctx.output.table(units.iter().map(UnitRow::from).collect())
}

pub async fn regions(ctx: &CommandContext) -> Result<()> {
    let board = ctx.load_board(StatusFilter::Pending).await?;
    let rows: Vec<RegionRow> = board.regions().iter().map(RegionRow::from).collect();

    ctx.output.section(format!("Departamentos: {}", rows.len()));
    ctx.output.table(rows)
}

pub async fn show(args: CodeArgs, ctx: &CommandContext) -> Result<()> {
    let mut board = ctx.load_board(StatusFilter::All).await?;
    let listed = ctx.find_unit(&board, &args.code)?;
    let unit = board.refresh(&listed.id).await?;

    if ctx.output.is_json() {
        return ctx.output.result(&unit);
    }

    let display = unit.status().display();
    ctx.output.section(format!("Conglomerado {}", unit.code));
    ctx.output.kv("Id", &unit.id);
    ctx.output.kv("Estado", ctx.output.badge(display.label, display.badge));
    match &unit.review {
        ReviewState::Pending => {}
        ReviewState::Approved { region } => {
            let label = match &region.name {
                Some(name) => format!("{} ({})", name, region.id),
                None => region.id.to_string(),
            };
            ctx.output.kv("Departamento", label);
        }
        ReviewState::Rejected { reason } => ctx.output.kv("Razón", reason),
    }
    ctx.output.kv("Coordenadas", unit.coordinates());
    ctx.output.kv("Creado", unit.created_label());
    Ok(())
}
