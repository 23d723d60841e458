use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes::{self, Registries};
use crate::config::LawOfficeConfig;
use crate::contract::client::LawOfficeApi;
use crate::domain::{AppointmentRegistry, CaseRegistry, ClientRegistry, RegistryConfig};
use crate::gateways::local::LawOfficeLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmLawOfficeRepository;

pub const MODULE_NAME: &str = "law_office";

/// Wiring produced by `init`.
struct Wired {
    registries: Registries,
    api: Arc<dyn LawOfficeApi>,
}

/// Clients, cases and appointments behind one repository and three registries.
#[derive(Default)]
pub struct LawOffice {
    // Read-mostly after init.
    wired: ArcSwapOption<Wired>,
}

impl LawOffice {
    pub fn new() -> Self {
        Self::default()
    }

    /// In-process API, available once `init` has run.
    pub fn api(&self) -> Option<Arc<dyn LawOfficeApi>> {
        self.wired.load().as_ref().map(|w| w.api.clone())
    }
}

#[async_trait]
impl Module for LawOffice {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing law_office module");

        let cfg: LawOfficeConfig = ctx.module_config();
        debug!(enforce_references = cfg.enforce_references, "Loaded law_office config");

        // The handle is lazy: nothing connects here.
        let db = ctx.db_required()?;
        let repo = Arc::new(SeaOrmLawOfficeRepository::new(db));
        let config = RegistryConfig {
            enforce_references: cfg.enforce_references,
        };

        let clients = Arc::new(ClientRegistry::new(repo.clone()));
        let cases = Arc::new(CaseRegistry::new(repo.clone(), repo.clone(), config));
        let appointments = Arc::new(AppointmentRegistry::new(
            repo.clone(),
            repo.clone(),
            repo,
            config,
        ));

        let api: Arc<dyn LawOfficeApi> = Arc::new(LawOfficeLocalClient::new(
            clients.clone(),
            cases.clone(),
            appointments.clone(),
        ));

        self.wired.store(Some(Arc::new(Wired {
            registries: Registries {
                clients,
                cases,
                appointments,
            },
            api,
        })));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for LawOffice {
    async fn migrate(&self, conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running law_office database migrations");
        Migrator::up(conn, None).await?;
        info!("law_office migrations completed");
        Ok(())
    }
}

impl RestfulModule for LawOffice {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering law_office REST routes");

        let registries = self
            .wired
            .load()
            .as_ref()
            .map(|w| w.registries.clone())
            .ok_or_else(|| anyhow::anyhow!("law_office is not initialized"))?;

        routes::register_routes(router, openapi, registries)
    }
}
