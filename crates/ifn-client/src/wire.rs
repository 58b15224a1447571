//! JSON shapes exchanged with the conglomerado service

use chrono::{DateTime, Utc};
use ifn_core::error::{IfnError, Result};
use ifn_core::models::{
    RegionId, RegionRecord, RegionRef, ReviewState, UnitId, UnitRecord, UnitStatus,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Ids come back as strings from some endpoints and as numbers from others
#[derive(Deserialize)]
#[serde(untagged)]
enum OpaqueId {
    Text(String),
    Number(serde_json::Number),
}

impl From<OpaqueId> for String {
    fn from(id: OpaqueId) -> Self {
        match id {
            OpaqueId::Text(s) => s,
            OpaqueId::Number(n) => n.to_string(),
        }
    }
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    OpaqueId::deserialize(deserializer).map(String::from)
}

fn opaque_id_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<OpaqueId>::deserialize(deserializer)?.map(String::from))
}

/// Coordinates stored as NUMERIC are serialized as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

fn loose_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Number(n) => Ok(n),
        LooseNumber::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRegion {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub codigo: Option<String>,
}

impl From<WireRegion> for RegionRecord {
    fn from(region: WireRegion) -> Self {
        RegionRecord {
            id: RegionId(region.id),
            name: region.nombre,
            code: region.codigo.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUnit {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub codigo: String,
    #[serde(deserialize_with = "loose_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub lon: f64,
    pub estado: UnitStatus,
    #[serde(default, deserialize_with = "opaque_id_opt")]
    pub departamento_id: Option<String>,
    #[serde(default)]
    pub departamentos: Option<WireRegion>,
    #[serde(default)]
    pub razon_rechazo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<WireUnit> for UnitRecord {
    type Error = IfnError;

    /// Fails when the status and its payload disagree, e.g. an approved
    /// unit without a region
    fn try_from(unit: WireUnit) -> Result<Self> {
        let review = match unit.estado {
            UnitStatus::Pending => ReviewState::Pending,
            UnitStatus::Approved => {
                let region_id = unit
                    .departamento_id
                    .or_else(|| unit.departamentos.as_ref().map(|d| d.id.clone()))
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| {
                        IfnError::Serialization(format!(
                            "approved conglomerado {} has no departamento",
                            unit.codigo
                        ))
                    })?;
                let mut region = RegionRef::new(RegionId(region_id));
                if let Some(d) = unit.departamentos {
                    region = region.with_name(d.nombre);
                }
                ReviewState::Approved { region }
            }
            UnitStatus::Rejected => {
                let reason = unit
                    .razon_rechazo
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| {
                        IfnError::Serialization(format!(
                            "rejected conglomerado {} has no razon_rechazo",
                            unit.codigo
                        ))
                    })?;
                ReviewState::Rejected { reason }
            }
        };

        Ok(UnitRecord {
            id: UnitId(unit.id),
            code: unit.codigo,
            latitude: unit.lat,
            longitude: unit.lon,
            review,
            created_at: unit.created_at,
        })
    }
}

/// Decision endpoints answer with the unit, bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UnitEnvelope {
    Wrapped { conglomerado: WireUnit },
    Bare(WireUnit),
}

impl UnitEnvelope {
    pub fn into_unit(self) -> WireUnit {
        match self {
            UnitEnvelope::Wrapped { conglomerado } => conglomerado,
            UnitEnvelope::Bare(unit) => unit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApproveRequest<'a> {
    pub departamento_id: &'a str,
    pub asignado_por: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RejectRequest<'a> {
    pub razon: &'a str,
    pub asignado_por: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub cantidad: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub conglomerados: Vec<WireUnit>,
}

/// Error payload; services use either field
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Shown when the service answers with JSON that carries no message
pub const GENERIC_REQUEST_ERROR: &str = "Error en la petición";

impl ErrorBody {
    /// `None` when the body is not a JSON error object
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn into_message(self) -> String {
        self.error.or(self.message).unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string())
    }
}

/// Convert a list of wire units, failing on the first inconsistent one
pub fn into_units(units: Vec<WireUnit>) -> Result<Vec<UnitRecord>> {
    units.into_iter().map(UnitRecord::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<UnitRecord> {
        let wire: WireUnit = serde_json::from_value(value).unwrap();
        UnitRecord::try_from(wire)
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let unit = parse(json!({
            "id": 42, "codigo": "C-042", "lat": 4.6, "lon": -74.1,
            "estado": "pendiente", "created_at": "2024-05-01T08:30:00Z"
        }))
        .unwrap();
        assert_eq!(unit.id, UnitId::from("42"));

        let unit = parse(json!({
            "id": "9f1c", "codigo": "C-043", "lat": "4.60", "lon": "-74.10",
            "estado": "pendiente", "created_at": "2024-05-01T08:30:00Z"
        }))
        .unwrap();
        assert_eq!(unit.id, UnitId::from("9f1c"));
        assert_eq!(unit.latitude, 4.6);
    }

    #[test]
    fn test_approved_carries_embedded_region_name() {
        let unit = parse(json!({
            "id": 7, "codigo": "C-007", "lat": 6.2, "lon": -75.5,
            "estado": "aprobado", "departamento_id": 5,
            "departamentos": {"id": 5, "nombre": "Antioquia", "codigo": "05"},
            "created_at": "2024-05-01T08:30:00Z"
        }))
        .unwrap();
        let region = unit.assigned_region().unwrap();
        assert_eq!(region.id, RegionId::from("5"));
        assert_eq!(region.name.as_deref(), Some("Antioquia"));
    }

    #[test]
    fn test_inconsistent_records_are_refused() {
        let err = parse(json!({
            "id": 8, "codigo": "C-008", "lat": 6.2, "lon": -75.5,
            "estado": "aprobado", "created_at": "2024-05-01T08:30:00Z"
        }))
        .unwrap_err();
        assert!(matches!(err, IfnError::Serialization(_)));

        let err = parse(json!({
            "id": 9, "codigo": "C-009", "lat": 6.2, "lon": -75.5,
            "estado": "rechazado", "razon_rechazo": " ", "created_at": "2024-05-01T08:30:00Z"
        }))
        .unwrap_err();
        assert!(matches!(err, IfnError::Serialization(_)));
    }

    #[test]
    fn test_envelope_accepts_both_shapes() {
        let unit = json!({
            "id": 1, "codigo": "C-001", "lat": 4.6, "lon": -74.1,
            "estado": "rechazado", "razon_rechazo": "cuerpo de agua",
            "created_at": "2024-05-01T08:30:00Z"
        });
        let bare: UnitEnvelope = serde_json::from_value(unit.clone()).unwrap();
        let wrapped: UnitEnvelope = serde_json::from_value(json!({ "conglomerado": unit })).unwrap();
        assert_eq!(bare.into_unit().codigo, "C-001");
        assert_eq!(wrapped.into_unit().codigo, "C-001");
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body =
            ErrorBody::parse(r#"{"error": "Conglomerado ya revisado", "message": "x"}"#).unwrap();
        assert_eq!(body.into_message(), "Conglomerado ya revisado");
        assert!(ErrorBody::parse("<html>").is_none());
        assert_eq!(ErrorBody::parse("{}").unwrap().into_message(), GENERIC_REQUEST_ERROR);
    }

    #[test]
    fn test_request_bodies() {
        let body = serde_json::to_value(ApproveRequest { departamento_id: "5", asignado_por: "U1" })
            .unwrap();
        assert_eq!(body, json!({"departamento_id": "5", "asignado_por": "U1"}));
        let body = serde_json::to_value(GenerateRequest { cantidad: 10 }).unwrap();
        assert_eq!(body, json!({"cantidad": 10}));
    }
}
