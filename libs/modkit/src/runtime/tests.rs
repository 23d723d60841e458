//! Lifecycle tests for the runner: phase order, lazy migrations and shutdown.

use crate::context::{ConfigProvider, ModuleCtx};
use crate::contracts::{DbModule, Module, StatefulModule};
use crate::registry::{ModuleEntry, ModuleRegistry};
use crate::runtime::{run, DbOptions, RunOptions, ShutdownOptions};
use async_trait::async_trait;
use modkit_db::{ConnectOpts, DbHandle};
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct NoConfig;

impl ConfigProvider for NoConfig {
    fn get_module_config(&self, _module_name: &str) -> Option<&serde_json::Value> {
        None
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, e: impl Into<String>) {
        self.events.lock().push(e.into());
    }
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

struct Probe {
    name: &'static str,
    log: Arc<Recorder>,
}

#[async_trait]
impl Module for Probe {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        assert_eq!(ctx.current_module(), Some(self.name));
        self.log.push(format!("init:{}", self.name));
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for Probe {
    async fn migrate(&self, _conn: &DatabaseConnection) -> anyhow::Result<()> {
        self.log.push(format!("migrate:{}", self.name));
        Ok(())
    }
}

#[async_trait]
impl StatefulModule for Probe {
    async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.log.push(format!("start:{}", self.name));
        Ok(())
    }
    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.log.push(format!("stop:{}", self.name));
        Ok(())
    }
}

fn registry(log: &Arc<Recorder>) -> ModuleRegistry {
    let a = Arc::new(Probe {
        name: "a",
        log: log.clone(),
    });
    let b = Arc::new(Probe {
        name: "b",
        log: log.clone(),
    });
    ModuleRegistry::builder()
        .register(
            ModuleEntry::new("a", a.clone())
                .db(a.clone())
                .stateful(a),
        )
        .register(ModuleEntry::new("b", b.clone()).stateful(b))
        .build()
        .expect("valid registry")
}

#[tokio::test]
async fn phases_run_in_order_and_stop_reverses() {
    let log = Arc::new(Recorder::default());
    let db = Arc::new(DbHandle::new("sqlite::memory:", ConnectOpts::default()).unwrap());
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run(RunOptions {
        modules_cfg: Arc::new(NoConfig),
        db: DbOptions::Handle(db.clone()),
        shutdown: ShutdownOptions::Token(cancel.clone()),
        registry: registry(&log),
    }));

    tokio::time::timeout(Duration::from_secs(5), async {
        while !log.events().iter().any(|e| e == "start:b") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("modules should start");

    cancel.cancel();
    task.await.unwrap().unwrap();

    assert_eq!(
        log.events(),
        vec![
            "init:a", "init:b", "migrate:a", "start:a", "start:b", "stop:b", "stop:a"
        ]
    );
}

#[tokio::test]
async fn unreachable_database_does_not_abort_startup() {
    let log = Arc::new(Recorder::default());
    let opts = ConnectOpts {
        acquire_timeout: Some(Duration::from_millis(200)),
        ..ConnectOpts::default()
    };
    let db = Arc::new(DbHandle::new("postgres://nobody:pw@127.0.0.1:1/none", opts).unwrap());

    run(RunOptions {
        modules_cfg: Arc::new(NoConfig),
        db: DbOptions::Handle(db),
        shutdown: ShutdownOptions::Future(Box::pin(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        })),
        registry: registry(&log),
    })
    .await
    .unwrap();

    let events = log.events();
    assert!(!events.iter().any(|e| e.starts_with("migrate")));
    assert!(events.contains(&"stop:a".to_string()));
}

#[tokio::test]
async fn migrations_run_directly_for_connected_handle() {
    let log = Arc::new(Recorder::default());
    let conn = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(DbHandle::from_connection(conn));
    let cancel = CancellationToken::new();
    cancel.cancel();

    run(RunOptions {
        modules_cfg: Arc::new(NoConfig),
        db: DbOptions::Handle(db),
        shutdown: ShutdownOptions::Token(cancel),
        registry: registry(&log),
    })
    .await
    .unwrap();

    assert!(log.events().contains(&"migrate:a".to_string()));
}
