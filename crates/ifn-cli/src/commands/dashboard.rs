//! Dashboard command implementation

use super::CommandContext;
use crate::output_types::{DashboardOutput, UnitRow};
use crate::progress::with_spinner;
use anyhow::Result;
use ifn_core::models::{StatusFilter, UnitRecord, UnitStatus};

/// Number of recent conglomerados shown
const LATEST: usize = 10;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let board = ctx.load_board(StatusFilter::All).await?;
    let statistics = with_spinner(
        ctx.output.is_json(),
        "Loading statistics...",
        "Statistics loaded",
        board.statistics(),
    )
    .await?;

    let latest = latest(board.units(), LATEST);

    if ctx.output.is_json() {
        return ctx.output.result(DashboardOutput { statistics, latest });
    }

    ctx.output.section("Conglomerados");
    ctx.output.kv("Total", statistics.total);
    for status in UnitStatus::ALL {
        let display = status.display();
        ctx.output.kv(ctx.output.badge(display.label, display.badge), statistics.count(status));
    }

    ctx.output.section(format!("Latest {}", LATEST));
    ctx.output.table(latest.iter().map(UnitRow::from).collect())
}

/// Most recently created units, newest first
fn latest(units: &[UnitRecord], limit: usize) -> Vec<UnitRecord> {
    let mut units = units.to_vec();
    units.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    units.truncate(limit);
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_latest_is_newest_first_and_bounded() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let units: Vec<UnitRecord> = (0..15)
            .map(|i| {
                UnitRecord::pending(
                    i.to_string(),
                    format!("C-{:03}", i),
                    4.0,
                    -74.0,
                    base + Duration::days(i),
                )
            })
            .collect();

        let result = latest(&units, 10);

        assert_eq!(result.len(), 10);
        assert_eq!(result[0].code, "C-014");
        assert_eq!(result[9].code, "C-005");
    }
}
