use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};
use ifn_core::models::UnitRecord;
use serde_json::{Map, Value as JsonValue};

use crate::extent::national_extent;

/// Export units as a GeoJSON point layer.
///
/// Each feature carries the unit id as its feature id and the review state
/// as properties, so the layer can be styled by status in external tools.
pub fn units_to_geojson(units: &[UnitRecord]) -> FeatureCollection {
    let features = units.iter().map(unit_to_feature).collect();

    FeatureCollection {
        features,
        bbox: Some(national_extent().bbox().to_vec()),
        foreign_members: None,
    }
}

fn unit_to_feature(unit: &UnitRecord) -> Feature {
    let status = unit.status();

    let mut properties = Map::new();
    properties.insert("codigo".to_string(), JsonValue::from(unit.code.clone()));
    properties.insert("estado".to_string(), JsonValue::from(status.wire_name()));
    properties.insert("label".to_string(), JsonValue::from(status.display().label));
    properties.insert("created_at".to_string(), JsonValue::from(unit.created_at.to_rfc3339()));

    if let Some(region) = unit.assigned_region() {
        properties.insert("departamento_id".to_string(), JsonValue::from(region.id.as_str()));
        if let Some(ref name) = region.name {
            properties.insert("departamento".to_string(), JsonValue::from(name.clone()));
        }
    }

    if let Some(reason) = unit.rejection_reason() {
        properties.insert("razon_rechazo".to_string(), JsonValue::from(reason));
    }

    Feature {
        geometry: Some(Geometry::new(Value::Point(vec![unit.longitude, unit.latitude]))),
        properties: Some(properties),
        id: Some(Id::String(unit.id.to_string())),
        bbox: None,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ifn_core::models::{RegionId, RegionRef};

    fn units() -> Vec<UnitRecord> {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let mut approved = UnitRecord::pending("2", "C-002", 6.25, -75.56, created);
        approved
            .record_approval(RegionRef::new(RegionId::from("05")).with_name("Antioquia"))
            .unwrap();
        vec![UnitRecord::pending("1", "C-001", 4.6, -74.08, created), approved]
    }

    #[test]
    fn test_feature_per_unit_in_input_order() {
        let collection = units_to_geojson(&units());
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].id, Some(Id::String("1".to_string())));
        assert_eq!(collection.features[1].id, Some(Id::String("2".to_string())));
    }

    #[test]
    fn test_point_uses_lon_lat_order() {
        let collection = units_to_geojson(&units());
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![-74.08, 4.6]));
    }

    #[test]
    fn test_properties_follow_review_state() {
        let collection = units_to_geojson(&units());

        let pending = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(pending["estado"], "pendiente");
        assert!(!pending.contains_key("departamento_id"));

        let approved = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(approved["estado"], "aprobado");
        assert_eq!(approved["departamento_id"], "05");
        assert_eq!(approved["departamento"], "Antioquia");
        assert!(!approved.contains_key("razon_rechazo"));
    }
}
