use serde::{Deserialize, Serialize};
use std::fmt;

use super::unit::UnitStatus;

/// Status filter of the review screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] =
        [StatusFilter::All, StatusFilter::Pending, StatusFilter::Approved, StatusFilter::Rejected];

    /// The status this filter keeps, or `None` for `All`
    pub fn status(&self) -> Option<UnitStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(UnitStatus::Pending),
            StatusFilter::Approved => Some(UnitStatus::Approved),
            StatusFilter::Rejected => Some(UnitStatus::Rejected),
        }
    }

    pub fn matches(&self, status: UnitStatus) -> bool {
        self.status().is_none_or(|wanted| wanted == status)
    }

    /// Parse a filter value. Unknown values fall back to `All`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "todos" | "all" | "" => StatusFilter::All,
            other => match UnitStatus::parse(other) {
                Some(status) => status.into(),
                None => {
                    tracing::debug!("Unknown status filter '{}', showing all units", s);
                    StatusFilter::All
                }
            },
        }
    }
}

impl From<UnitStatus> for StatusFilter {
    fn from(status: UnitStatus) -> Self {
        match status {
            UnitStatus::Pending => StatusFilter::Pending,
            UnitStatus::Approved => StatusFilter::Approved,
            UnitStatus::Rejected => StatusFilter::Rejected,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{}", status),
            None => f.write_str("all"),
        }
    }
}
