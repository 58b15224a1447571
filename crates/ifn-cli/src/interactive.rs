use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use ifn_core::models::{UnitId, UnitRecord};
use ifn_review::CommitOutcome;
use std::time::Instant;

use crate::backend::Board;
use crate::errors;
use crate::output::OutputWriter;

/// What the reviewer can do with the picked conglomerado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewAction {
    Approve,
    Reject,
    ShowDetails,
    Back,
}

impl ReviewAction {
    fn label(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "Approve",
            ReviewAction::Reject => "Reject",
            ReviewAction::ShowDetails => "Show details",
            ReviewAction::Back => "Back",
        }
    }
}

/// Decisions are only offered while the unit is pending
fn actions_for(unit: &UnitRecord) -> Vec<ReviewAction> {
    let mut actions = Vec::with_capacity(4);
    if unit.is_pending() {
        actions.extend([ReviewAction::Approve, ReviewAction::Reject]);
    }
    actions.extend([ReviewAction::ShowDetails, ReviewAction::Back]);
    actions
}

/// Interactive review console: pick a conglomerado, then decide on it.
/// Service failures are shown and the loop keeps going.
pub async fn review_loop(board: &mut Board, output: &OutputWriter) -> Result<()> {
    println!("\n🌳 IFN Conglomerado Review\n");

    loop {
        let units = board.visible();
        if units.is_empty() {
            output.info("No conglomerados match the current filter");
            return Ok(());
        }

        let mut items: Vec<String> = units.iter().map(unit_item).collect();
        items.push("Quit".to_string());

        let choice = Select::new()
            .with_prompt(format!("Conglomerados ({})", units.len()))
            .items(&items)
            .default(0)
            .interact()?;
        let Some(unit) = units.get(choice) else {
            return Ok(());
        };

        if let Err(e) = board.select(&unit.id, Instant::now()) {
            errors::from_ifn(&e).display();
            continue;
        }

        let actions = actions_for(unit);
        let labels: Vec<&str> = actions.iter().map(ReviewAction::label).collect();
        let index = Select::new()
            .with_prompt(format!("Conglomerado {}", unit.code))
            .items(&labels)
            .default(0)
            .interact()?;

        match actions.get(index).copied().unwrap_or(ReviewAction::Back) {
            ReviewAction::Approve => approve(board, output, &unit.id).await?,
            ReviewAction::Reject => reject(board, output, &unit.id).await?,
            ReviewAction::ShowDetails => show_details(board, output),
            ReviewAction::Back => board.clear_selection(),
        }
    }
}

fn unit_item(unit: &UnitRecord) -> String {
    let display = unit.status().display();
    format!("{:<12} {:<10} {}", unit.code, display.label, unit.coordinates().format(4))
}

async fn approve(board: &mut Board, output: &OutputWriter, id: &UnitId) -> Result<()> {
    let decision = match board.begin_approve(id) {
        Ok(decision) => decision,
        Err(e) => {
            errors::from_ifn(&e).display();
            return Ok(());
        }
    };

    let regions = board.regions().to_vec();
    if regions.is_empty() {
        output.warning("No departamentos are available to assign");
        board.cancel_decision();
        return Ok(());
    }
    let labels: Vec<String> = regions.iter().map(|r| r.label()).collect();
    let index = Select::new().with_prompt("Departamento").items(&labels).default(0).interact()?;
    board.select_region(regions[index].id.clone());

    let confirmed = Confirm::new()
        .with_prompt(format!("Approve {} into {}?", decision.unit_code, labels[index]))
        .default(true)
        .interact()?;

    commit(board, output, confirmed).await
}

async fn reject(board: &mut Board, output: &OutputWriter, id: &UnitId) -> Result<()> {
    let decision = match board.begin_reject(id) {
        Ok(decision) => decision,
        Err(e) => {
            errors::from_ifn(&e).display();
            return Ok(());
        }
    };

    let reason: String =
        Input::new().with_prompt("Rejection reason").allow_empty(true).interact_text()?;
    board.set_reason(&reason);
    if !board.can_commit() {
        output.warning("A rejection reason is required");
        board.cancel_decision();
        return Ok(());
    }

    let confirmed = Confirm::new()
        .with_prompt(format!("Reject {}?", decision.unit_code))
        .default(true)
        .interact()?;

    commit(board, output, confirmed).await
}

async fn commit(board: &mut Board, output: &OutputWriter, confirmed: bool) -> Result<()> {
    if !confirmed {
        board.cancel_decision();
        output.info("Decision discarded");
        return Ok(());
    }

    match board.confirm().await {
        Ok(CommitOutcome::Committed) => output.success("Decision saved"),
        Ok(CommitOutcome::AlreadyInFlight) => output.info("This decision is already being sent"),
        Ok(CommitOutcome::Dismissed) => output.info("Decision saved after the dialog closed"),
        Err(e) => errors::from_ifn(&e).display(),
    }
    if !board.is_consistent() {
        output.warning("The list could not be reloaded and may be out of date");
    }
    Ok(())
}

fn show_details(board: &mut Board, output: &OutputWriter) {
    let now = Instant::now();
    let events = board.selection_mut().map_mut().finish_animations();
    for event in events {
        if let Err(e) = board.handle_map_event(event, now) {
            errors::from_ifn(&e).display();
        }
    }

    match board.selection().map().overlay() {
        Some(overlay) => {
            output.section(&overlay.title);
            for line in &overlay.lines {
                println!("  {}", line);
            }
        }
        None => output.info("Nothing selected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ifn_core::models::{RegionId, RegionRef};

    fn unit() -> UnitRecord {
        UnitRecord::pending("1", "CONG-00001", 4.6, -74.1, Utc::now())
    }

    #[test]
    fn test_pending_unit_offers_decisions() {
        assert_eq!(
            actions_for(&unit()),
            vec![
                ReviewAction::Approve,
                ReviewAction::Reject,
                ReviewAction::ShowDetails,
                ReviewAction::Back
            ]
        );
    }

    #[test]
    fn test_reviewed_units_offer_no_decisions() {
        let mut approved = unit();
        approved.record_approval(RegionRef::new(RegionId::from("25"))).unwrap();
        let mut rejected = unit();
        rejected.record_rejection("Zona inundada").unwrap();

        for reviewed in [approved, rejected] {
            assert_eq!(actions_for(&reviewed), vec![ReviewAction::ShowDetails, ReviewAction::Back]);
        }
    }
}
