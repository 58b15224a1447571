//! Reviewer identity lookup against the user directory

use ifn_core::config::LayeredConfig;
use ifn_core::error::{IfnError, Result};
use ifn_core::models::{Actor, ActorId, Role, Session};
use serde::Deserialize;
use std::time::Duration;

use crate::http::status_error;

const SUSPENDED: &str = "suspendido";

/// Profile returned by the user directory
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "profile_id")]
    pub id: String,
    pub nombre: String,
    pub correo: String,
    pub rol: Role,
    #[serde(default)]
    pub estado: Option<String>,
}

fn profile_id<'de, D: serde::Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid user id: {}", other))),
    }
}

impl UserProfile {
    /// Turn the profile into a session, refusing suspended accounts and
    /// roles that may not review
    pub fn into_session(self, access_token: &str) -> Result<Session> {
        if self.estado.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(SUSPENDED)) {
            return Err(IfnError::AccountSuspended { email: self.correo });
        }
        if !self.rol.can_review() {
            return Err(IfnError::Forbidden { role: self.rol.to_string() });
        }

        Ok(Session::new(
            access_token,
            Actor { id: ActorId(self.id), name: self.nombre, email: self.correo, role: self.rol },
        ))
    }
}

/// Client for the user directory service
pub struct IdentityDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl IdentityDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IfnError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url: base_url.into(), client })
    }

    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        Self::new(config.auth_url.value.clone(), config.request_timeout())
    }

    /// Look up the owner of `access_token` by `email` and build a session
    pub async fn resolve(&self, access_token: &str, email: &str) -> Result<Session> {
        if access_token.trim().is_empty() {
            return Err(IfnError::MissingSession);
        }

        let url = format!("{}/api/users/correo/{}", self.base_url, email.trim());
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IfnError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let profile: UserProfile = response
            .json()
            .await
            .map_err(|e| IfnError::Serialization(format!("Unexpected user profile: {}", e)))?;

        let session = profile.into_session(access_token)?;
        tracing::debug!("Resolved profile of {}", session.actor.email);
        Ok(session)
    }
}
