use async_trait::async_trait;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use anyhow::Result;
use axum::http::Method;
use axum::{middleware::from_fn, routing::get, Router};
use modkit::api::{OpenApiRegistry, OperationSpec, ResponseSpec, SchemaCollection};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

const STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// API ingress: owns the HTTP server (REST host) and collects typed
/// operation specs to emit a single OpenAPI document.
pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    // Component schemas, serialized once at registration
    components: ArcSwap<BTreeMap<String, Value>>,
    // Finalized router from the REST phase, taken by `start`
    final_router: Mutex<Option<Router>>,

    // Duplicate detection per (method, path)
    registered_routes: DashMap<(Method, String), ()>,
    operation_specs: DashMap<String, OperationSpec>,

    server: Mutex<Option<JoinHandle<Result<()>>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            components: ArcSwap::from_pointee(BTreeMap::new()),
            final_router: Mutex::new(None),
            registered_routes: DashMap::new(),
            operation_specs: DashMap::new(),
            server: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Address the server is listening on, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Router produced by `rest_finalize`, if the REST phase has run and the
    /// server has not taken it yet.
    pub fn finalized_router(&self) -> Option<Router> {
        self.final_router.lock().clone()
    }

    /// Wrap `router` in the request middleware stack.
    ///
    /// Layers are applied innermost first, so requests pass through
    /// SetRequestId, PropagateRequestId, Trace, push_req_id, Timeout, CORS, BodyLimit.
    fn apply_middleware(&self, mut router: Router) -> Router {
        let cfg = self.get_config();
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));
        router
    }

    fn schema_ref(name: &str) -> Value {
        json!({ "$ref": format!("#/components/schemas/{name}") })
    }

    fn response_schema(components: &BTreeMap<String, Value>, resp: &ResponseSpec) -> Value {
        let base = match resp.schema_name.as_deref() {
            Some(name) if components.contains_key(name) => Self::schema_ref(name),
            _ => json!({ "type": "object" }),
        };
        if resp.array {
            json!({ "type": "array", "items": base })
        } else if resp.nullable {
            json!({ "oneOf": [base, { "type": "null" }] })
        } else {
            base
        }
    }

    fn operation_json(components: &BTreeMap<String, Value>, spec: &OperationSpec) -> Value {
        let mut operation = serde_json::Map::new();

        let op_id = spec
            .operation_id
            .clone()
            .unwrap_or_else(|| spec.handler_id.clone());
        operation.insert("operationId".into(), Value::String(op_id));
        if let Some(summary) = &spec.summary {
            operation.insert("summary".into(), Value::String(summary.clone()));
        }
        if let Some(description) = &spec.description {
            operation.insert("description".into(), Value::String(description.clone()));
        }
        if !spec.tags.is_empty() {
            operation.insert("tags".into(), json!(spec.tags));
        }

        if !spec.params.is_empty() {
            let parameters: Vec<Value> = spec
                .params
                .iter()
                .map(|p| {
                    let mut schema = json!({ "type": p.param_type });
                    if let Some(format) = &p.format {
                        schema["format"] = Value::String(format.clone());
                    }
                    json!({
                        "name": p.name,
                        "in": "path",
                        "required": true,
                        "description": p.description,
                        "schema": schema,
                    })
                })
                .collect();
            operation.insert("parameters".into(), Value::Array(parameters));
        }

        if let Some(req) = &spec.request_body {
            let schema = match req.schema_name.as_deref() {
                Some(name) if components.contains_key(name) => Self::schema_ref(name),
                _ => json!({ "type": "object" }),
            };
            operation.insert(
                "requestBody".into(),
                json!({
                    "description": req.description,
                    "required": req.required,
                    "content": { req.content_type: { "schema": schema } },
                }),
            );
        }

        let mut responses = serde_json::Map::new();
        for resp in &spec.responses {
            let mut obj = serde_json::Map::new();
            obj.insert("description".into(), Value::String(resp.description.clone()));
            if let Some(ct) = resp.content_type {
                obj.insert(
                    "content".into(),
                    json!({ ct: { "schema": Self::response_schema(components, resp) } }),
                );
            }
            responses.insert(resp.status.to_string(), Value::Object(obj));
        }
        operation.insert("responses".into(), Value::Object(responses));

        Value::Object(operation)
    }

    /// Build the OpenAPI document from registered operations and components.
    pub fn build_openapi(&self) -> Result<Value> {
        let components = self.components.load();
        tracing::info!(
            operations = self.operation_specs.len(),
            schemas = components.len(),
            "Building OpenAPI document"
        );

        let mut paths: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
        for entry in self.operation_specs.iter() {
            let spec = entry.value();
            paths
                .entry(spec.path.clone())
                .or_default()
                .insert(spec.method.as_str().to_lowercase(), Self::operation_json(&components, spec));
        }

        let doc = openapi::OpenApi {
            openapi: "3.1.0",
            info: openapi::OpenApiInfo {
                title: "Lawdesk API",
                version: env!("CARGO_PKG_VERSION"),
                description: Some("Clients, cases and appointments of a law office"),
            },
            paths: serde_json::to_value(paths)?,
            components: openapi::OpenApiComponents {
                schemas: (**components).clone(),
            },
        };
        Ok(serde_json::to_value(doc)?)
    }

    async fn serve(
        listener: tokio::net::TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(module = MODULE_NAME, bind_addr = %cfg.bind_addr, "Module initialized");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// REST host role: prepare/finalize the router, but do not start the server here.
impl modkit::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &modkit::ModuleCtx, router: Router) -> Result<Router> {
        tracing::debug!("REST host prepared base router with health check");
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, _ctx: &modkit::ModuleCtx, mut router: Router) -> Result<Router> {
        if self.get_config().enable_docs {
            // Build once, serve as static JSON
            let openapi_value = Arc::new(self.build_openapi()?);
            router = router
                .route(
                    "/openapi.json",
                    get({
                        use axum::{http::header, response::IntoResponse};
                        let v = openapi_value.clone();
                        move || async move {
                            let json = axum::Json((*v).clone());
                            ([(header::CACHE_CONTROL, "no-store")], json).into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        let router = self.apply_middleware(router);
        *self.final_router.lock() = Some(router.clone());

        tracing::debug!("REST host finalized router");
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

#[async_trait]
impl modkit::StatefulModule for ApiIngress {
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cfg.bind_addr, e))?;

        // Take the finalized router so the guard is dropped before awaits
        let router = { self.final_router.lock().take() };
        let router = match router {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving health only");
                self.apply_middleware(Router::new().route("/health", get(web::health_check)))
            }
        };

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        *self.local_addr.lock() = Some(local);
        tracing::info!(addr = %local, "HTTP server bound");

        let handle = tokio::spawn(Self::serve(listener, router, cancel));
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, cancel: CancellationToken) -> Result<()> {
        cancel.cancel();
        let handle = { self.server.lock().take() };
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::warn!(timeout = ?STOP_TIMEOUT, "HTTP server did not stop in time");
                Ok(())
            }
        }
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_operation(&self, spec: &OperationSpec) {
        // First registration wins; a second one is a programming error.
        let route_key = (spec.method.clone(), spec.path.clone());
        if self.registered_routes.insert(route_key, ()).is_some() {
            tracing::error!(
                method = %spec.method.as_str(),
                path = %spec.path,
                "Duplicate (method, path) detected; ignoring subsequent registration"
            );
            return;
        }

        self.operation_specs
            .insert(spec.handler_id.clone(), spec.clone());
        tracing::debug!(
            handler_id = %spec.handler_id,
            method = %spec.method.as_str(),
            path = %spec.path,
            total_operations = self.operation_specs.len(),
            "Registered API operation"
        );
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        // Copy-on-write snapshot
        let current = self.components.load();
        let mut reg = (**current).clone();
        let mut changed = false;

        for (key, schema) in schemas {
            let value = match serde_json::to_value(&schema) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(%key, error = %e, "Failed to serialize schema");
                    continue;
                }
            };
            match reg.get(&key) {
                Some(existing) if *existing == value => {}
                Some(_) => {
                    tracing::warn!(%key, "Conflicting schema under the same component key; keeping the first");
                }
                None => {
                    reg.insert(key, value);
                    changed = true;
                }
            }
        }

        if changed {
            self.components.store(Arc::new(reg));
        }
        name.to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit::api::OperationBuilder;
    use modkit::Problem;

    async fn ok() -> &'static str {
        "ok"
    }

    fn ingress_with_ops() -> ApiIngress {
        let ingress = ApiIngress::default();
        let _router: Router = OperationBuilder::get("/api/things/{id}")
            .operation_id("things.get")
            .tag("things")
            .uuid_path_param("id", "Thing id")
            .handler(ok)
            .nullable_json_response::<Problem>(&ingress, 200, "Maybe a thing")
            .problem_response(&ingress, 404, "Not found")
            .register(Router::new(), &ingress);
        let _router: Router = OperationBuilder::get("/api/things")
            .handler(ok)
            .json_array_response::<Problem>(&ingress, 200, "All things")
            .register(Router::new(), &ingress);
        ingress
    }

    #[test]
    fn openapi_contains_paths_and_components() {
        let doc = ingress_with_ops().build_openapi().unwrap();

        assert_eq!(doc["openapi"], "3.1.0");
        let get = &doc["paths"]["/api/things/{id}"]["get"];
        assert_eq!(get["operationId"], "things.get");
        assert_eq!(get["parameters"][0]["schema"]["format"], "uuid");
        assert_eq!(get["parameters"][0]["required"], true);
        assert_eq!(
            get["responses"]["404"]["content"]["application/problem+json"]["schema"]["$ref"],
            "#/components/schemas/Problem"
        );
        assert!(get["responses"]["200"]["content"]["application/json"]["schema"]["oneOf"].is_array());

        let list = &doc["paths"]["/api/things"]["get"];
        assert_eq!(
            list["responses"]["200"]["content"]["application/json"]["schema"]["type"],
            "array"
        );
        assert!(doc["components"]["schemas"]["Problem"].is_object());
        assert!(doc["components"]["schemas"]["ValidationError"].is_object());
    }

    #[test]
    fn duplicate_routes_are_ignored() {
        let ingress = ingress_with_ops();
        let _router: Router = OperationBuilder::get("/api/things")
            .operation_id("dup")
            .handler(ok)
            .empty_response(204, "dup")
            .register(Router::new(), &ingress);
        assert_eq!(ingress.operation_specs.len(), 2);
        let doc = ingress.build_openapi().unwrap();
        assert_ne!(doc["paths"]["/api/things"]["get"]["operationId"], "dup");
    }
}
