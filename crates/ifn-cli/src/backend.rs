use anyhow::{Context, Result};
use ifn_client::{HttpConglomeradoService, IdentityDirectory, MemoryConglomeradoService};
use ifn_core::config::LayeredConfig;
use ifn_core::models::{Actor, ActorId, RegionId, Role, Session, SessionContext};
use ifn_core::ports::ConglomeradoService;
use ifn_geo::HeadlessMap;
use ifn_review::{ReviewBoard, SelectionConfig};
use std::sync::Arc;

use crate::cli::ServiceBackend;
use crate::errors;
use crate::progress::with_spinner;

/// Departamentos seeded into the in-memory backend
const DEMO_REGIONS: &[(&str, &str, &str)] = &[
    ("5", "Antioquia", "05"),
    ("8", "Atlántico", "08"),
    ("11", "Bogotá D.C.", "11"),
    ("15", "Boyacá", "15"),
    ("18", "Caquetá", "18"),
    ("19", "Cauca", "19"),
    ("25", "Cundinamarca", "25"),
    ("50", "Meta", "50"),
    ("52", "Nariño", "52"),
    ("91", "Amazonas", "91"),
];

const DEMO_UNITS: u32 = 24;

/// Review board as used by the commands
pub type Board = ReviewBoard<dyn ConglomeradoService, HeadlessMap>;

/// The service adapter together with the session it authorizes with
pub struct Backend {
    kind: ServiceBackend,
    pub session: SessionContext,
    pub service: Arc<dyn ConglomeradoService>,
}

impl Backend {
    /// Create the adapter. Nobody is signed in yet.
    pub fn new(kind: ServiceBackend, config: &LayeredConfig) -> Result<Self> {
        let session = SessionContext::new();
        let service: Arc<dyn ConglomeradoService> = match kind {
            ServiceBackend::Http => Arc::new(
                HttpConglomeradoService::from_config(config, session.clone())
                    .context("Failed to create the HTTP client")?,
            ),
            ServiceBackend::Memory => {
                let memory = MemoryConglomeradoService::new(session.clone());
                for (id, name, code) in DEMO_REGIONS {
                    memory.insert_region(id, name, code);
                }
                Arc::new(memory)
            }
        };
        Ok(Self { kind, session, service })
    }

    /// Sign in: resolve the token owner against the user directory, or use
    /// the demo reviewer for the in-memory backend
    pub async fn sign_in(&self, config: &LayeredConfig, quiet: bool) -> Result<()> {
        match self.kind {
            ServiceBackend::Http => {
                let token = config.access_token.value.clone().ok_or_else(errors::not_signed_in)?;
                let email = config.email.value.clone().ok_or_else(errors::not_signed_in)?;
                let directory = IdentityDirectory::from_config(config)?;

                let session = with_spinner(
                    quiet,
                    "Signing in...",
                    "Signed in",
                    directory.resolve(&token, &email),
                )
                .await?;
                self.session.sign_in(session);
            }
            ServiceBackend::Memory => {
                self.session.sign_in(demo_session());
                self.seed().await?;
            }
        }
        Ok(())
    }

    /// Fill the in-memory backend with demo conglomerados, some reviewed
    async fn seed(&self) -> Result<()> {
        let units = self.service.generate(DEMO_UNITS).await?;
        let actor = demo_session().actor.id;

        for (i, unit) in units.iter().enumerate() {
            match i % 4 {
                1 => {
                    let (id, _, _) = DEMO_REGIONS[i % DEMO_REGIONS.len()];
                    self.service.approve(&unit.id, &RegionId::from(id), &actor).await?;
                }
                3 => {
                    self.service.reject(&unit.id, "Zona de difícil acceso", &actor).await?;
                }
                _ => {}
            }
        }
        tracing::debug!("Seeded {} demo conglomerados", units.len());
        Ok(())
    }

    pub fn board(&self, config: &LayeredConfig) -> Board {
        ReviewBoard::new(
            self.service.clone(),
            self.session.clone(),
            HeadlessMap::new(),
            SelectionConfig::from_config(config),
        )
    }
}

fn demo_session() -> Session {
    Session::new(
        "demo",
        Actor {
            id: ActorId::from("demo"),
            name: "Demo Reviewer".to_string(),
            email: "demo@ifn.local".to_string(),
            role: Role::AdminPro,
        },
    )
}
