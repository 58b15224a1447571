//! Authenticated session supplied by the external identity provider.
//!
//! A `SessionContext` is created empty, filled at sign-in and emptied at
//! sign-out. Controllers and adapters receive a clone of the context at
//! construction and read the current session on every call, so signing out
//! immediately stops all further requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{IfnError, Result};

/// Identifier of the reviewer recorded as `asignado_por`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Console roles known to the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    AdminPro,
    AdminBrigadas,
    Brigadista,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Only AdminPro users generate and review conglomerados
    pub fn can_review(&self) -> bool {
        matches!(self, Role::AdminPro)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::AdminPro => "AdminPro",
            Role::AdminBrigadas => "AdminBrigadas",
            Role::Brigadista => "Brigadista",
            Role::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The signed-in reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Access token plus the actor it belongs to
#[derive(Clone)]
pub struct Session {
    access_token: String,
    pub actor: Actor,
}

impl Session {
    pub fn new(access_token: impl Into<String>, actor: Actor) -> Self {
        Self { access_token: access_token.into(), actor }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("actor", &self.actor)
            .finish()
    }
}

/// Shared handle to the current session, if any
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    /// Context with nobody signed in
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that starts signed in
    pub fn signed_in(session: Session) -> Self {
        let ctx = Self::new();
        ctx.sign_in(session);
        ctx
    }

    pub fn sign_in(&self, session: Session) {
        tracing::info!("Signed in as {} ({})", session.actor.email, session.actor.role);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn sign_out(&self) {
        if self.current.write().unwrap_or_else(PoisonError::into_inner).take().is_some() {
            tracing::info!("Signed out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// The current session, or `MissingSession`
    pub fn require(&self) -> Result<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(IfnError::MissingSession)
    }

    /// Bearer token for the next request
    pub fn bearer_token(&self) -> Result<String> {
        let session = self.require()?;
        if session.access_token().trim().is_empty() {
            return Err(IfnError::MissingSession);
        }
        Ok(session.access_token().to_string())
    }

    pub fn actor(&self) -> Result<Actor> {
        Ok(self.require()?.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor {
            id: ActorId::from("U1"),
            name: "Ana".to_string(),
            email: "ana@ifn.gov.co".to_string(),
            role: Role::AdminPro,
        }
    }

    #[test]
    fn test_empty_context_has_no_token() {
        let ctx = SessionContext::new();
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.bearer_token(), Err(IfnError::MissingSession)));
    }

    #[test]
    fn test_sign_in_and_out() {
        let ctx = SessionContext::new();
        let clone = ctx.clone();

        ctx.sign_in(Session::new("tok", actor()));
        assert_eq!(clone.bearer_token().unwrap(), "tok");
        assert_eq!(clone.actor().unwrap().id, ActorId::from("U1"));

        ctx.sign_out();
        assert!(!clone.is_authenticated());
    }

    #[test]
    fn test_blank_token_is_missing() {
        let ctx = SessionContext::signed_in(Session::new("  ", actor()));
        assert!(matches!(ctx.bearer_token(), Err(IfnError::MissingSession)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("secret-token", actor());
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_role_deserializes_unknown() {
        let role: Role = serde_json::from_str("\"Auditor\"").unwrap();
        assert_eq!(role, Role::Unknown);
        assert!(!role.can_review());
        assert!(Role::AdminPro.can_review());
    }
}
