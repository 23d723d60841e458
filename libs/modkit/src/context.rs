use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use modkit_db::DbHandle;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Returns raw JSON section for the module, if any.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

#[derive(Clone)]
pub struct ModuleCtx {
    pub(crate) db: Option<Arc<DbHandle>>,
    pub(crate) config_provider: Option<Arc<dyn ConfigProvider>>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                cancellation_token: token,
                module_name: None,
            },
        }
    }
    pub fn with_db(mut self, db: Arc<DbHandle>) -> Self {
        self.inner.db = Some(db);
        self
    }
    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }
    pub fn for_module(mut self, name: &str) -> Self {
        self.inner.module_name = Some(Arc::<str>::from(name));
        self
    }
    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    /// Scope context to a specific module name (used by the registry).
    pub(crate) fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::<str>::from(name));
        self
    }

    // ---- public read-only API for modules ----
    pub fn db(&self) -> Option<Arc<DbHandle>> {
        self.db.clone()
    }

    /// Shared database handle or an error naming the module that needs it.
    pub fn db_required(&self) -> anyhow::Result<Arc<DbHandle>> {
        self.db.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "module '{}' requires a database but none is configured",
                self.current_module().unwrap_or("?")
            )
        })
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Best-effort: deserialize the module's config into `T`, fallback to `T::default()`
    /// if the section is missing. An invalid section is logged and replaced by the default.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        let (Some(name), Some(p)) = (&self.module_name, &self.config_provider) else {
            return T::default();
        };
        match p.get_module_config(name) {
            Some(v) => serde_json::from_value::<T>(v.clone()).unwrap_or_else(|e| {
                tracing::warn!(module = %name, error = %e, "invalid module config; using defaults");
                T::default()
            }),
            None => T::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Cfg {
        #[serde(default)]
        flag: bool,
    }

    fn ctx_with(module: &str, value: Option<serde_json::Value>) -> ModuleCtx {
        let mut map = HashMap::new();
        if let Some(v) = value {
            map.insert(module.to_string(), v);
        }
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(MapProvider(map)))
            .for_module(module)
            .build()
    }

    #[test]
    fn module_config_reads_section() {
        let ctx = ctx_with("m", Some(serde_json::json!({"flag": true})));
        assert_eq!(ctx.module_config::<Cfg>(), Cfg { flag: true });
    }

    #[test]
    fn module_config_falls_back_to_default() {
        let missing = ctx_with("m", None);
        assert_eq!(missing.module_config::<Cfg>(), Cfg::default());

        let invalid = ctx_with("m", Some(serde_json::json!({"other": 1})));
        assert_eq!(invalid.module_config::<Cfg>(), Cfg::default());
    }

    #[test]
    fn db_required_without_db_fails() {
        let ctx = ctx_with("law_office", None);
        assert!(ctx.db().is_none());
        let err = ctx.db_required().unwrap_err();
        assert!(err.to_string().contains("law_office"));
    }
}
