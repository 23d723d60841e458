#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use api_ingress::ApiIngress;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use law_office::{LawOffice, MODULE_NAME};
use modkit::{ConfigProvider, DbModule, Module, ModuleCtx, ModuleCtxBuilder, RestfulModule};
use modkit_db::{ConnectOpts, DbHandle};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct StaticConfig(HashMap<String, Value>);

impl ConfigProvider for StaticConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&Value> {
        self.0.get(module_name)
    }
}

pub struct TestApp {
    pub router: Router,
    pub module: Arc<LawOffice>,
    pub ingress: Arc<ApiIngress>,
}

fn ctx(db: Arc<DbHandle>, module_cfg: Value) -> ModuleCtx {
    let mut sections = HashMap::new();
    sections.insert(MODULE_NAME.to_string(), module_cfg);
    ModuleCtxBuilder::new(CancellationToken::new())
        .with_db(db)
        .with_config_provider(Arc::new(StaticConfig(sections)))
        .for_module(MODULE_NAME)
        .build()
}

/// Fresh in-memory SQLite with migrations applied and routes registered.
pub async fn test_app() -> TestApp {
    test_app_with(serde_json::json!({})).await
}

pub async fn test_app_with(module_cfg: Value) -> TestApp {
    let db = Arc::new(
        DbHandle::connect("sqlite::memory:", ConnectOpts::default())
            .await
            .expect("in-memory sqlite"),
    );
    let conn = db.conn().await.expect("connection");
    let app = wire(db, module_cfg).await;
    app.module.migrate(&conn).await.expect("migrations");
    app
}

/// Wire the module over `db` without migrating or connecting.
pub async fn wire(db: Arc<DbHandle>, module_cfg: Value) -> TestApp {
    let ctx = ctx(db, module_cfg);
    let module = Arc::new(LawOffice::new());
    module.init(&ctx).await.expect("init");

    let ingress = Arc::new(ApiIngress::default());
    let router = module
        .register_rest(&ctx, Router::new(), ingress.as_ref())
        .expect("register routes");

    TestApp {
        router,
        module,
        ingress,
    }
}

/// Handle that can never connect; fails fast.
pub fn unreachable_db() -> Arc<DbHandle> {
    let opts = ConnectOpts {
        acquire_timeout: Some(Duration::from_millis(200)),
        ..ConnectOpts::default()
    };
    Arc::new(DbHandle::new("postgres://nobody:pw@127.0.0.1:1/none", opts).expect("valid dsn"))
}

impl TestApp {
    /// Send a request and decode the JSON body (`Value::Null` for an empty one).
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.call("DELETE", uri, None).await
    }

    /// Create a client and return its id.
    pub async fn create_client(&self, first: &str, last: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/clients",
                serde_json::json!({"firstName": first, "lastName": last, "email": email}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_case(&self, client_id: &str, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/cases",
                serde_json::json!({"clientId": client_id, "title": title}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}
