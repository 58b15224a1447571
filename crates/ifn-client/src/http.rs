use async_trait::async_trait;
use ifn_core::config::LayeredConfig;
use ifn_core::error::{IfnError, Result};
use ifn_core::models::{
    ActorId, RegionId, RegionRecord, SessionContext, UnitId, UnitRecord, UnitStatistics,
    UnitStatus,
};
use ifn_core::ports::ConglomeradoService;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::wire::{
    into_units, ApproveRequest, ErrorBody, GenerateRequest, GenerateResponse, RejectRequest,
    UnitEnvelope, WireRegion, WireUnit,
};

/// `ConglomeradoService` over the REST API
pub struct HttpConglomeradoService {
    /// Base URL of the service (e.g., "http://localhost:3000")
    base_url: String,

    /// Source of the bearer token for every request
    session: SessionContext,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpConglomeradoService {
    pub fn new(base_url: impl Into<String>, session: SessionContext, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IfnError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url: base_url.into(), session, client })
    }

    pub fn from_config(config: &LayeredConfig, session: SessionContext) -> Result<Self> {
        Self::new(config.api_url.value.clone(), session, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/conglomerados{}", self.base_url, path)
    }

    /// Attach the session token and send. The token is read per call so a
    /// sign-out takes effect immediately.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.session.bearer_token()?;
        let response = request.bearer_auth(token).send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.dispatch(request)
            .await?
            .json()
            .await
            .map_err(|e| IfnError::Serialization(format!("Unexpected response: {}", e)))
    }
}

fn transport_error(e: reqwest::Error) -> IfnError {
    if e.is_timeout() {
        IfnError::Transport("request timed out".to_string())
    } else {
        IfnError::Transport(e.to_string())
    }
}

/// Map a non-success response to an error
pub fn status_error(status: StatusCode, body: &str) -> IfnError {
    if status == StatusCode::UNAUTHORIZED {
        return IfnError::AuthExpired;
    }
    let reason = status.canonical_reason().unwrap_or("Unknown");
    IfnError::remote(status.as_u16(), reason, ErrorBody::parse(body).map(ErrorBody::into_message))
}

#[async_trait]
impl ConglomeradoService for HttpConglomeradoService {
    async fn list_units(&self, status: Option<UnitStatus>) -> Result<Vec<UnitRecord>> {
        let url = match status {
            Some(status) => self.url(&format!("/estado/{}", status.wire_name())),
            None => self.url(""),
        };
        tracing::debug!("GET {}", url);
        let units: Vec<WireUnit> = self.send(self.client.get(url)).await?;
        into_units(units)
    }

    async fn get_unit(&self, id: &UnitId) -> Result<UnitRecord> {
        let url = self.url(&format!("/{}", id));
        tracing::debug!("GET {}", url);
        let response = self.dispatch(self.client.get(url)).await.map_err(|e| match e {
            IfnError::Remote { status: Some(404), .. } => IfnError::UnitNotFound { id: id.to_string() },
            other => other,
        })?;
        let envelope: UnitEnvelope = response
            .json()
            .await
            .map_err(|e| IfnError::Serialization(format!("Unexpected response: {}", e)))?;
        UnitRecord::try_from(envelope.into_unit())
    }

    async fn list_regions(&self) -> Result<Vec<RegionRecord>> {
        let url = format!("{}/api/departamentos", self.base_url);
        tracing::debug!("GET {}", url);
        let regions: Vec<WireRegion> = self.send(self.client.get(url)).await?;
        Ok(regions.into_iter().map(RegionRecord::from).collect())
    }

    async fn approve(&self, id: &UnitId, region: &RegionId, actor: &ActorId) -> Result<UnitRecord> {
        let url = self.url(&format!("/{}/aprobar", id));
        tracing::debug!("PUT {}", url);
        let body = ApproveRequest { departamento_id: region.as_str(), asignado_por: actor.as_str() };
        let envelope: UnitEnvelope = self.send(self.client.put(url).json(&body)).await?;
        UnitRecord::try_from(envelope.into_unit())
    }

    async fn reject(&self, id: &UnitId, reason: &str, actor: &ActorId) -> Result<UnitRecord> {
        let url = self.url(&format!("/{}/rechazar", id));
        tracing::debug!("PUT {}", url);
        let body = RejectRequest { razon: reason, asignado_por: actor.as_str() };
        let envelope: UnitEnvelope = self.send(self.client.put(url).json(&body)).await?;
        UnitRecord::try_from(envelope.into_unit())
    }

    async fn generate(&self, count: u32) -> Result<Vec<UnitRecord>> {
        let url = self.url("/generar");
        tracing::debug!("POST {} ({})", url, count);
        let response: GenerateResponse =
            self.send(self.client.post(url).json(&GenerateRequest { cantidad: count })).await?;
        into_units(response.conglomerados)
    }

    async fn statistics(&self) -> Result<UnitStatistics> {
        let url = self.url("/estadisticas");
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn delete_unit(&self, id: &UnitId) -> Result<()> {
        let url = self.url(&format!("/{}", id));
        tracing::debug!("DELETE {}", url);
        self.dispatch(self.client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_auth_expired() {
        let err = status_error(StatusCode::UNAUTHORIZED, r#"{"error": "jwt expired"}"#);
        assert!(matches!(err, IfnError::AuthExpired));
        assert!(err.requires_reauthentication());
    }

    #[test]
    fn test_service_message_is_kept() {
        let err = status_error(StatusCode::CONFLICT, r#"{"message": "Conglomerado ya revisado"}"#);
        assert_eq!(err.to_string(), "Conglomerado ya revisado");
    }

    #[test]
    fn test_generic_message_without_body() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "Error 500: Internal Server Error");
    }

    #[test]
    fn test_json_body_without_message_is_generic() {
        let err = status_error(StatusCode::BAD_REQUEST, r#"{"detalle": "campo inválido"}"#);
        assert_eq!(err.to_string(), "Error en la petición");
        assert!(matches!(err, IfnError::Remote { status: Some(400), .. }));
    }

    #[test]
    fn test_urls() {
        let service = HttpConglomeradoService::new(
            "http://localhost:3000",
            SessionContext::new(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(service.url(""), "http://localhost:3000/api/conglomerados");
        assert_eq!(service.url("/7/aprobar"), "http://localhost:3000/api/conglomerados/7/aprobar");
    }

    #[tokio::test]
    async fn test_no_session_fails_before_any_request() {
        // Nothing listens on this port; a request would be a transport error.
        let service = HttpConglomeradoService::new(
            "http://127.0.0.1:9",
            SessionContext::new(),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = service.list_units(None).await.unwrap_err();
        assert!(matches!(err, IfnError::MissingSession));
    }
}
