use chrono::{DateTime, Utc};
use ifn_core::models::{
    Overlay, RegionRecord, ReviewState, UnitRecord, UnitStatistics, Viewport,
};
use ifn_review::CommitOutcome;
use serde::Serialize;
use tabled::Tabled;

/// Table row for a conglomerado
#[derive(Debug, Serialize, Tabled)]
pub struct UnitRow {
    #[tabled(rename = "Código")]
    pub code: String,
    #[tabled(rename = "Estado")]
    pub status: String,
    #[tabled(rename = "Departamento")]
    pub region: String,
    #[tabled(rename = "Latitud")]
    pub latitude: String,
    #[tabled(rename = "Longitud")]
    pub longitude: String,
    #[tabled(rename = "Creado")]
    pub created: String,
}

impl From<&UnitRecord> for UnitRow {
    fn from(unit: &UnitRecord) -> Self {
        let region = match &unit.review {
            ReviewState::Approved { region } => {
                region.name.clone().unwrap_or_else(|| region.id.to_string())
            }
            _ => "-".to_string(),
        };
        Self {
            code: unit.code.clone(),
            status: unit.status().display().label.to_string(),
            region,
            latitude: format!("{:.4}", unit.latitude),
            longitude: format!("{:.4}", unit.longitude),
            created: unit.created_label(),
        }
    }
}

/// Table row for a departamento
#[derive(Debug, Serialize, Tabled)]
pub struct RegionRow {
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Nombre")]
    pub name: String,
    #[tabled(rename = "Código")]
    pub code: String,
}

impl From<&RegionRecord> for RegionRow {
    fn from(region: &RegionRecord) -> Self {
        Self { id: region.id.to_string(), name: region.name.clone(), code: region.code.clone() }
    }
}

/// Table row for a configuration value
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Output for whoami command
#[derive(Debug, Serialize)]
pub struct WhoamiOutput {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Output for dashboard command
#[derive(Debug, Serialize)]
pub struct DashboardOutput {
    pub statistics: UnitStatistics,
    pub latest: Vec<UnitRecord>,
}

/// Output for list command
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub status_filter: String,
    pub search: String,
    pub count: usize,
    pub units: Vec<UnitRecord>,
}

/// Output for locate command
#[derive(Debug, Serialize)]
pub struct LocateOutput {
    pub code: String,
    pub viewport: Viewport,
    pub overlay: Option<Overlay>,
}

/// Output for approve and reject commands
#[derive(Debug, Serialize)]
pub struct DecisionOutput {
    pub code: String,
    pub outcome: CommitOutcome,
    pub unit: Option<UnitRecord>,
    /// False when the list could not be reloaded after the decision
    pub consistent: bool,
}

/// Output for generate command
#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub requested: u32,
    pub created: usize,
    pub subparcels: usize,
    pub codes: Vec<String>,
    pub outside_extent: Vec<String>,
}

/// Output for export command
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub path: String,
    pub features: usize,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ifn_core::models::{RegionId, RegionRef};

    #[test]
    fn test_unit_row_formatting() {
        let created = Utc.with_ymd_and_hms(2024, 11, 2, 15, 0, 0).unwrap();
        let mut unit = UnitRecord::pending("4", "C-004", 5.123456, -73.987654, created);
        unit.record_approval(RegionRef::new(RegionId::from("15")).with_name("Boyacá")).unwrap();

        let row = UnitRow::from(&unit);

        assert_eq!(row.status, "Aprobado");
        assert_eq!(row.region, "Boyacá");
        assert_eq!(row.latitude, "5.1235");
        assert_eq!(row.longitude, "-73.9877");
        assert_eq!(row.created, "02/11/2024");
    }

    #[test]
    fn test_region_falls_back_to_id() {
        let created = Utc.with_ymd_and_hms(2024, 11, 2, 15, 0, 0).unwrap();
        let mut unit = UnitRecord::pending("4", "C-004", 5.1, -73.9, created);
        unit.record_approval(RegionRef::new(RegionId::from("15"))).unwrap();
        assert_eq!(UnitRow::from(&unit).region, "15");
    }
}
