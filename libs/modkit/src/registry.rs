use axum::Router;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use thiserror::Error;

use crate::context;
use crate::contracts;

/// One module and the capabilities it provides.
pub struct ModuleEntry {
    pub name: &'static str,
    pub core: Arc<dyn contracts::Module>,
    pub rest: Option<Arc<dyn contracts::RestfulModule>>,
    pub rest_host: Option<Arc<dyn contracts::RestHostModule>>,
    pub db: Option<Arc<dyn contracts::DbModule>>,
    pub stateful: Option<Arc<dyn contracts::StatefulModule>>,
}

impl ModuleEntry {
    pub fn new(name: &'static str, core: Arc<dyn contracts::Module>) -> Self {
        Self {
            name,
            core,
            rest: None,
            rest_host: None,
            db: None,
            stateful: None,
        }
    }

    pub fn rest(mut self, m: Arc<dyn contracts::RestfulModule>) -> Self {
        self.rest = Some(m);
        self
    }

    pub fn rest_host(mut self, m: Arc<dyn contracts::RestHostModule>) -> Self {
        self.rest_host = Some(m);
        self
    }

    pub fn db(mut self, m: Arc<dyn contracts::DbModule>) -> Self {
        self.db = Some(m);
        self
    }

    pub fn stateful(mut self, m: Arc<dyn contracts::StatefulModule>) -> Self {
        self.stateful = Some(m);
        self
    }
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("has_rest", &self.rest.is_some())
            .field("is_rest_host", &self.rest_host.is_some())
            .field("has_db", &self.db.is_some())
            .field("has_stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Collects module entries in registration order.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<ModuleEntry>,
}

impl RegistryBuilder {
    pub fn register(mut self, entry: ModuleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Validate names and the REST host count, keeping registration order.
    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut seen = HashSet::new();
        for e in &self.entries {
            if !seen.insert(e.name) {
                return Err(RegistryError::DuplicateModule(e.name));
            }
        }

        let hosts = self.entries.iter().filter(|e| e.rest_host.is_some()).count();
        if hosts > 1 {
            return Err(RegistryError::MultipleRestHosts);
        }
        if hosts == 0 && self.entries.iter().any(|e| e.rest.is_some()) {
            return Err(RegistryError::RestRequiresHost);
        }

        Ok(ModuleRegistry {
            modules: self.entries,
        })
    }
}

/// The runtime registry; phases walk modules in registration order.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name).collect();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    // ---- Ordered phases: init → DB → REST (sync) → start → stop ----

    pub async fn run_init_phase(&self, base_ctx: &context::ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base_ctx.clone().for_module(e.name);
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, conn: &DatabaseConnection) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(dbm) = &e.db {
                tracing::info!(module = e.name, "running migrations");
                dbm.migrate(conn)
                    .await
                    .map_err(|source| RegistryError::DbMigrate {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub fn run_rest_phase(
        &self,
        base_ctx: &context::ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        let Some(host_entry) = self.modules.iter().find(|e| e.rest_host.is_some()) else {
            return Ok(router);
        };
        let Some(host) = host_entry.rest_host.as_ref() else {
            return Err(RegistryError::RestHostMissingFromEntry);
        };
        let host_ctx = base_ctx.clone().for_module(host_entry.name);
        let registry: &dyn contracts::OpenApiRegistry = host.as_registry();

        // 1) Host prepare: base Router
        router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_entry.name,
                source,
            })?;

        // 2) Register all REST providers
        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest
                    .register_rest(&ctx, router, registry)
                    .map_err(|source| RegistryError::RestRegister {
                        module: e.name,
                        source,
                    })?;
            }
        }

        // 3) Host finalize: /openapi.json, /docs, middleware (no server start)
        router = host
            .rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_entry.name,
                source,
            })?;

        Ok(router)
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub async fn run_stop_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "Failed to stop module");
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("module '{0}' registered twice")]
    DuplicateModule(&'static str),
    #[error("REST modules are registered but no REST host is present")]
    RestRequiresHost,
    #[error("multiple REST host modules registered")]
    MultipleRestHosts,
    #[error("REST host entry has no host implementation")]
    RestHostMissingFromEntry,
    #[error("init failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for module '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
