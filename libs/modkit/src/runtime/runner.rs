//! ModKit runtime runner.
//!
//! One stable [`ModuleCtx`](crate::ModuleCtx) is built up front and reused
//! across all phases (init → db → rest → start → wait → stop).
//!
//! The database phase is tied to the first successful connection: migrations
//! are installed as the handle's connect hook, so a database that is down at
//! boot is retried on the next request instead of failing the process.

use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use modkit_db::{connect_hook, DbHandle};
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

/// How the runtime should provide a database to modules.
pub enum DbOptions {
    /// No database integration. `ModuleCtx::db()` will be `None`, `db_required()` will error.
    None,
    /// A shared, lazily connected handle.
    Handle(Arc<DbHandle>),
}

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we initiate shutdown.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

/// Options for running the ModKit runner.
pub struct RunOptions {
    /// Provider of module config sections (raw JSON by module name).
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
    /// Modules to drive, in registration order.
    pub registry: ModuleRegistry,
}

/// Full cycle: init → db → rest (sync) → start → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let cancel = match &opts.shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match opts.shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                match shutdown::wait_for_shutdown().await {
                    Ok(signal) => tracing::info!(signal, "shutdown: signal received"),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "shutdown: signal listener failed; falling back to ctrl_c()"
                        );
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::info!("shutdown: external token will control lifecycle");
        }
    }

    let registry = Arc::new(opts.registry);

    let mut ctx_builder =
        ModuleCtxBuilder::new(cancel.clone()).with_config_provider(opts.modules_cfg.clone());
    if let DbOptions::Handle(db) = &opts.db {
        ctx_builder = ctx_builder.with_db(db.clone());
    }
    let base_ctx = ctx_builder.build();

    tracing::info!("Phase: init");
    registry.run_init_phase(&base_ctx).await?;

    if let DbOptions::Handle(db) = &opts.db {
        tracing::info!(engine = ?db.engine(), "Phase: db");
        if db.is_connected() {
            // Handle was built from an existing connection; the hook would never fire.
            let conn = db.conn().await?;
            registry.run_db_phase(&conn).await?;
        } else {
            let reg = registry.clone();
            db.set_on_connect(connect_hook(move |conn| {
                let reg = reg.clone();
                async move {
                    reg.run_db_phase(&conn).await?;
                    Ok(())
                }
            }));
            // Warm up; a failure here is retried by the first request that needs the DB.
            if let Err(e) = db.conn().await {
                tracing::error!(error = %e, "database unavailable at startup; will retry on demand");
            }
        }
    }

    tracing::info!("Phase: rest (sync)");
    let _ = registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    registry.run_start_phase(cancel.clone()).await?;

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await?;

    if let DbOptions::Handle(db) = &opts.db {
        db.close().await;
    }
    Ok(())
}
