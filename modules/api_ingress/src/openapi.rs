use std::collections::BTreeMap;

use serde_json::Value;

#[derive(serde::Serialize)]
pub struct OpenApi {
    pub openapi: &'static str,
    pub info: OpenApiInfo,
    pub paths: Value,
    pub components: OpenApiComponents,
}

#[derive(serde::Serialize)]
pub struct OpenApiInfo {
    pub title: &'static str,
    pub version: &'static str,
    pub description: Option<&'static str>,
}

#[derive(serde::Serialize, Default, Clone)]
pub struct OpenApiComponents {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Value>,
}
