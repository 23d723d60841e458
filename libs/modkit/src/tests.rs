#[cfg(test)]
mod registry_tests {
    use axum::Router;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        api::SchemaCollection,
        context::ModuleCtxBuilder,
        contracts::{Module, OpenApiRegistry, RestHostModule, RestfulModule},
        registry::{ModuleEntry, ModuleRegistry, RegistryError},
    };

    // Minimal OpenAPI mock for REST phase
    struct MockOpenApi;
    impl OpenApiRegistry for MockOpenApi {
        fn ensure_schema_raw(&self, name: &str, _schemas: SchemaCollection) -> String {
            name.to_string()
        }
        fn register_operation(&self, _op: &crate::api::OperationSpec) {}
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct TestModule {
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        async fn init(&self, _ctx: &crate::context::ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    impl RestfulModule for TestModule {
        fn register_rest(
            &self,
            _ctx: &crate::context::ModuleCtx,
            router: Router,
            _openapi: &dyn OpenApiRegistry,
        ) -> anyhow::Result<Router> {
            use axum::routing::get;
            Ok(router.route(&format!("/{}", self.name), get(|| async { "test" })))
        }
    }

    type CallTracker = Arc<Mutex<Vec<String>>>;

    struct TestRestHost {
        calls: CallTracker,
    }

    #[async_trait::async_trait]
    impl Module for TestRestHost {
        async fn init(&self, _ctx: &crate::context::ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    impl RestHostModule for TestRestHost {
        fn as_registry(&self) -> &dyn OpenApiRegistry {
            static REG: MockOpenApi = MockOpenApi;
            &REG
        }

        fn rest_prepare(
            &self,
            _ctx: &crate::context::ModuleCtx,
            router: Router,
        ) -> anyhow::Result<Router> {
            self.calls.lock().push("prepare".to_string());
            Ok(router)
        }

        fn rest_finalize(
            &self,
            _ctx: &crate::context::ModuleCtx,
            router: Router,
        ) -> anyhow::Result<Router> {
            self.calls.lock().push("finalize".to_string());
            Ok(router)
        }
    }

    fn host(calls: &CallTracker) -> ModuleEntry {
        let h = Arc::new(TestRestHost {
            calls: calls.clone(),
        });
        ModuleEntry::new("host", h.clone()).rest_host(h)
    }

    fn rest(name: &'static str) -> ModuleEntry {
        let m = Arc::new(TestModule { name });
        ModuleEntry::new(name, m.clone()).rest(m)
    }

    #[tokio::test]
    async fn empty_registry_runs_all_phases() {
        let registry = ModuleRegistry::builder().build().expect("registry builds");
        let cancel = CancellationToken::new();
        let ctx = ModuleCtxBuilder::new(cancel.clone()).build();

        registry.run_init_phase(&ctx).await.expect("init");
        let _router = registry
            .run_rest_phase(&ctx, Router::new())
            .expect("rest is a no-op");
        registry.run_start_phase(cancel.clone()).await.expect("start");
        registry.run_stop_phase(cancel).await.expect("stop");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ModuleRegistry::builder()
            .register(rest("dup"))
            .register(rest("dup"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateModule("dup")));
    }

    #[test]
    fn rest_module_without_host_is_rejected() {
        let err = ModuleRegistry::builder()
            .register(rest("clients"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::RestRequiresHost));
    }

    #[test]
    fn two_hosts_are_rejected() {
        let calls = CallTracker::default();
        let h2 = Arc::new(TestRestHost {
            calls: calls.clone(),
        });
        let err = ModuleRegistry::builder()
            .register(host(&calls))
            .register(ModuleEntry::new("host2", h2.clone()).rest_host(h2))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::MultipleRestHosts));
    }

    #[test]
    fn host_wraps_module_registration() {
        let calls = CallTracker::default();
        let registry = ModuleRegistry::builder()
            .register(host(&calls))
            .register(rest("clients"))
            .register(rest("cases"))
            .build()
            .expect("registry builds");

        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        let _router = registry
            .run_rest_phase(&ctx, Router::new())
            .expect("rest phase");

        assert_eq!(*calls.lock(), vec!["prepare", "finalize"]);
        assert_eq!(registry.modules().len(), 3);
    }
}
