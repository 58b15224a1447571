use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Coordinates;
use super::region::RegionId;
use crate::error::{IfnError, Result};

/// Number of subparcelas (center + 4 cardinal points) per conglomerado
pub const SUBPARCELS_PER_UNIT: usize = 5;

/// Opaque conglomerado identifier assigned by the external service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Review lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "aprobado")]
    Approved,
    #[serde(rename = "rechazado")]
    Rejected,
}

/// Badge color class shown next to a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    Warning,
    Success,
    Danger,
}

/// Display metadata for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub badge: Badge,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 3] = [UnitStatus::Pending, UnitStatus::Approved, UnitStatus::Rejected];

    /// Name used by the external service in paths and payloads
    pub fn wire_name(&self) -> &'static str {
        match self {
            UnitStatus::Pending => "pendiente",
            UnitStatus::Approved => "aprobado",
            UnitStatus::Rejected => "rechazado",
        }
    }

    /// Parse a wire name or its English equivalent
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => Some(UnitStatus::Pending),
            "aprobado" | "approved" => Some(UnitStatus::Approved),
            "rechazado" | "rejected" => Some(UnitStatus::Rejected),
            _ => None,
        }
    }

    pub fn display(&self) -> StatusDisplay {
        match self {
            UnitStatus::Pending => StatusDisplay { label: "Pendiente", badge: Badge::Warning },
            UnitStatus::Approved => StatusDisplay { label: "Aprobado", badge: Badge::Success },
            UnitStatus::Rejected => StatusDisplay { label: "Rechazado", badge: Badge::Danger },
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitStatus::Pending => "pending",
            UnitStatus::Approved => "approved",
            UnitStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Region a unit was assigned to on approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    pub id: RegionId,

    /// Region name, when the service embedded it
    pub name: Option<String>,
}

impl RegionRef {
    pub fn new(id: RegionId) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Status together with the payload that only exists in that status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReviewState {
    Pending,
    Approved { region: RegionRef },
    Rejected { reason: String },
}

/// A conglomerado: one geographically located sampling unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub review: ReviewState,
    pub created_at: DateTime<Utc>,
}

impl UnitRecord {
    /// Create a unit awaiting review
    pub fn pending(
        id: impl Into<UnitId>,
        code: impl Into<String>,
        latitude: f64,
        longitude: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            latitude,
            longitude,
            review: ReviewState::Pending,
            created_at,
        }
    }

    pub fn status(&self) -> UnitStatus {
        match self.review {
            ReviewState::Pending => UnitStatus::Pending,
            ReviewState::Approved { .. } => UnitStatus::Approved,
            ReviewState::Rejected { .. } => UnitStatus::Rejected,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.review, ReviewState::Pending)
    }

    pub fn assigned_region(&self) -> Option<&RegionRef> {
        match &self.review {
            ReviewState::Approved { region } => Some(region),
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.review {
            ReviewState::Rejected { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Fails unless the unit is still awaiting review
    pub fn ensure_pending(&self) -> Result<()> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(IfnError::InvalidTransition { code: self.code.clone(), status: self.status() })
        }
    }

    /// Pending -> Approved
    pub fn record_approval(&mut self, region: RegionRef) -> Result<()> {
        self.ensure_pending()?;
        self.review = ReviewState::Approved { region };
        Ok(())
    }

    /// Pending -> Rejected
    pub fn record_rejection(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_pending()?;
        self.review = ReviewState::Rejected { reason: reason.into() };
        Ok(())
    }

    /// Creation date as shown in the console (dd/mm/yyyy)
    pub fn created_label(&self) -> String {
        self.created_at.format("%d/%m/%Y").to_string()
    }
}

/// Aggregate counts reported on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatistics {
    pub total: u64,
    #[serde(rename = "pendientes")]
    pub pending: u64,
    #[serde(rename = "aprobados")]
    pub approved: u64,
    #[serde(rename = "rechazados")]
    pub rejected: u64,
}

impl UnitStatistics {
    pub fn from_units(units: &[UnitRecord]) -> Self {
        units.iter().fold(Self::default(), |mut stats, unit| {
            stats.total += 1;
            match unit.status() {
                UnitStatus::Pending => stats.pending += 1,
                UnitStatus::Approved => stats.approved += 1,
                UnitStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }

    pub fn count(&self, status: UnitStatus) -> u64 {
        match status {
            UnitStatus::Pending => self.pending,
            UnitStatus::Approved => self.approved,
            UnitStatus::Rejected => self.rejected,
        }
    }
}
