//! Filter projection over the loaded unit collection

use ifn_core::models::{StatusFilter, UnitRecord};

/// Reduce `units` to the ones visible under `filter` and `search`.
///
/// The status predicate and the code search are ANDed. The search text is
/// trimmed and matched case-insensitively as a substring of the unit code;
/// blank search text matches everything. Input order is preserved.
pub fn project(units: &[UnitRecord], filter: StatusFilter, search: &str) -> Vec<UnitRecord> {
    project_refs(units, filter, search).into_iter().cloned().collect()
}

/// Borrowing variant of [`project`]
fn project_refs<'a>(
    units: &'a [UnitRecord],
    filter: StatusFilter,
    search: &str,
) -> Vec<&'a UnitRecord> {
    let needle = normalize_search(search);
    units
        .iter()
        .filter(|unit| filter.matches(unit.status()))
        .filter(|unit| matches_code(&unit.code, &needle))
        .collect()
}

/// Trimmed, lower-cased search text
fn normalize_search(search: &str) -> String {
    search.trim().to_lowercase()
}

fn matches_code(code: &str, needle: &str) -> bool {
    needle.is_empty() || code.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ifn_core::models::{RegionId, RegionRef, UnitStatus};

    fn collection() -> Vec<UnitRecord> {
        let now = Utc::now();
        let pending = UnitRecord::pending("1", "C-001", 4.6, -74.1, now);
        let mut approved = UnitRecord::pending("2", "C-002", 6.2, -75.5, now);
        approved.record_approval(RegionRef::new(RegionId::from("R7"))).unwrap();
        let mut rejected = UnitRecord::pending("3", "BX-010", 3.4, -76.5, now);
        rejected.record_rejection("cuerpo de agua").unwrap();
        vec![pending, approved, rejected]
    }

    fn ids(units: &[UnitRecord]) -> Vec<&str> {
        units.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_approved_filter_scenario() {
        let result = project(&collection(), StatusFilter::Approved, "");
        assert_eq!(ids(&result), vec!["2"]);
        assert_eq!(result[0].status(), UnitStatus::Approved);
    }

    #[test]
    fn test_all_with_empty_search_is_identity() {
        let units = collection();
        assert_eq!(project(&units, StatusFilter::All, ""), units);
        assert_eq!(project(&units, StatusFilter::All, "   "), units);
    }

    #[test]
    fn test_search_is_trimmed_and_case_insensitive() {
        let result = project(&collection(), StatusFilter::All, "  c-00 ");
        assert_eq!(ids(&result), vec!["1", "2"]);

        let result = project(&collection(), StatusFilter::All, "bx");
        assert_eq!(ids(&result), vec!["3"]);
    }

    #[test]
    fn test_predicates_compose_with_and() {
        let result = project(&collection(), StatusFilter::Pending, "C-002");
        assert!(result.is_empty());

        let result = project(&collection(), StatusFilter::Rejected, "010");
        assert_eq!(ids(&result), vec!["3"]);
    }

    #[test]
    fn test_unknown_filter_value_shows_everything() {
        let units = collection();
        let filter = StatusFilter::parse_lenient("en-campo");
        assert_eq!(project(&units, filter, "").len(), units.len());
    }
}
