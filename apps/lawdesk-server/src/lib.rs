//! Server wiring shared by the `lawdesk-server` binary and its tests:
//! config adapter, database handle, module registry and the run loop.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use law_office::LawOffice;
use modkit::{run, DbOptions, ModuleEntry, ModuleRegistry, RunOptions, ShutdownOptions};
use modkit_db::{absolutize_sqlite_dsn, redact_dsn, ConnectOpts, DbHandle};
use runtime::AppConfig;
use serde_json::{json, Value};

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Module sections as seen by modkit.
///
/// `api_ingress.bind_addr` falls back to `server.host:server.port`, and
/// `request_timeout_secs` to `server.timeout_sec` when that is set.
pub struct AppConfigProvider {
    modules: HashMap<String, Value>,
}

impl AppConfigProvider {
    pub fn new(config: &AppConfig) -> Self {
        let mut modules = config.modules.clone();
        let ingress = modules
            .entry(api_ingress::MODULE_NAME.to_string())
            .or_insert_with(|| json!({}));
        if let Value::Object(section) = ingress {
            section.entry("bind_addr").or_insert_with(|| {
                json!(format!("{}:{}", config.server.host, config.server.port))
            });
            if config.server.timeout_sec > 0 {
                section
                    .entry("request_timeout_secs")
                    .or_insert_with(|| json!(config.server.timeout_sec));
            }
        }
        Self { modules }
    }
}

impl modkit::ConfigProvider for AppConfigProvider {
    fn get_module_config(&self, module_name: &str) -> Option<&Value> {
        self.modules.get(module_name)
    }
}

/// Build the shared lazy database handle, or `None` when no database is configured.
///
/// SQLite paths are resolved against `server.home_dir`. Nothing connects here.
pub fn database_handle(config: &AppConfig) -> Result<Option<Arc<DbHandle>>> {
    let Some(db) = &config.database else {
        tracing::warn!("No database configuration found, running without database");
        return Ok(None);
    };

    let raw = db.url.trim();
    anyhow::ensure!(!raw.is_empty(), "database.url is not configured");

    let dsn = if raw.starts_with("sqlite:") {
        absolutize_sqlite_dsn(raw, Path::new(&config.server.home_dir), true)
            .context("invalid sqlite DSN")?
    } else {
        raw.to_string()
    };

    let opts = ConnectOpts {
        max_conns: db.max_conns,
        acquire_timeout: Some(DB_ACQUIRE_TIMEOUT),
        sqlite_busy_timeout: Duration::from_millis(u64::from(
            db.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        )),
        create_sqlite_dirs: true,
    };

    let handle = DbHandle::new(&dsn, opts)
        .with_context(|| format!("unsupported database DSN '{}'", redact_dsn(&dsn)))?;
    tracing::info!(engine = ?handle.engine(), dsn = %redact_dsn(&dsn), "Database configured");
    Ok(Some(Arc::new(handle)))
}

/// The process's modules, in start order. The ingress handle is returned for
/// callers that need the bound address.
pub fn build_registry() -> Result<(ModuleRegistry, Arc<ApiIngress>)> {
    let ingress = Arc::new(ApiIngress::default());
    let office = Arc::new(LawOffice::new());

    let registry = ModuleRegistry::builder()
        .register(
            ModuleEntry::new(api_ingress::MODULE_NAME, ingress.clone())
                .rest_host(ingress.clone())
                .stateful(ingress.clone()),
        )
        .register(
            ModuleEntry::new(law_office::MODULE_NAME, office.clone())
                .db(office.clone())
                .rest(office),
        )
        .build()?;

    Ok((registry, ingress))
}

/// Drive all modules until `shutdown` fires.
pub async fn run_server(
    config: &AppConfig,
    registry: ModuleRegistry,
    shutdown: ShutdownOptions,
) -> Result<()> {
    tracing::info!("Initializing modules...");

    let db = match database_handle(config)? {
        Some(handle) => DbOptions::Handle(handle),
        None => DbOptions::None,
    };

    run(RunOptions {
        modules_cfg: Arc::new(AppConfigProvider::new(config)),
        db,
        shutdown,
        registry,
    })
    .await
}

/// Validate what the server would use at startup without starting it.
pub fn check_config(config: &AppConfig) -> Result<()> {
    database_handle(config)?;

    let provider = AppConfigProvider::new(config);
    let ingress = provider
        .modules
        .get(api_ingress::MODULE_NAME)
        .cloned()
        .unwrap_or_else(|| json!({}));
    let ingress: ApiIngressConfig =
        serde_json::from_value(ingress).context("invalid modules.api_ingress section")?;
    ingress
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("invalid bind address '{}'", ingress.bind_addr))?;

    if let Some(section) = provider.modules.get(law_office::MODULE_NAME) {
        serde_json::from_value::<law_office::config::LawOfficeConfig>(section.clone())
            .context("invalid modules.law_office section")?;
    }
    Ok(())
}
