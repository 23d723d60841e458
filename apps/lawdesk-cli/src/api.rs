//! HTTP client for the law office REST API.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, Level};
use url::Url;
use uuid::Uuid;

use crate::model::{Appointment, Case, Client, ClientForm};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success answer; `code` and `detail` come from the Problem body when present.
    #[error("server answered {status}: {}", .detail.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        code: Option<String>,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[derive(Deserialize)]
struct ProblemBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// `base_url` is the server root; routes are resolved under `{base_url}/api/`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut raw = base_url.trim_end_matches('/').to_string();
        raw.push_str("/api/");
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(&raw)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.base.join(path)?;
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %method,
            http.url = %url,
            http.status_code = tracing::field::Empty,
        );

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }

        async move {
            let resp = req.send().await?;
            let status = resp.status();
            tracing::Span::current().record("http.status_code", status.as_u16());

            if status.is_success() {
                return Ok(resp);
            }
            let problem = resp.json::<ProblemBody>().await.ok();
            tracing::debug!(%status, code = ?problem.as_ref().and_then(|p| p.code.as_deref()), "request rejected");
            Err(ApiError::Status {
                status,
                code: problem.as_ref().and_then(|p| p.code.clone()),
                detail: problem.and_then(|p| p.detail),
            })
        }
        .instrument(span)
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(Method::GET, path, None::<&()>).await?;
        Ok(resp.json().await?)
    }

    /// `Ok(None)` for a 404 so detail pages can render their not-found state.
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        match self.get_json(path).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, ApiError> {
        self.get_json("clients").await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Option<Client>, ApiError> {
        self.get_optional(&format!("clients/{id}")).await
    }

    pub async fn create_client(&self, form: &ClientForm) -> Result<Client, ApiError> {
        let resp = self.send(Method::POST, "clients", Some(form)).await?;
        Ok(resp.json().await?)
    }

    /// `Ok(None)` when the server no longer has the record.
    pub async fn update_client(
        &self,
        id: Uuid,
        form: &ClientForm,
    ) -> Result<Option<Client>, ApiError> {
        let resp = self
            .send(Method::PUT, &format!("clients/{id}"), Some(form))
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_client(&self, id: Uuid) -> Result<(), ApiError> {
        self.send(Method::DELETE, &format!("clients/{id}"), None::<&()>)
            .await?;
        Ok(())
    }

    pub async fn list_cases(&self) -> Result<Vec<Case>, ApiError> {
        self.get_json("cases").await
    }

    pub async fn get_case(&self, id: Uuid) -> Result<Option<Case>, ApiError> {
        self.get_optional(&format!("cases/{id}")).await
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get_json("appointments").await
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, ApiError> {
        self.get_optional(&format!("appointments/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_resolve_under_api_prefix() {
        let api = ApiClient::new("http://localhost:8087/").unwrap();
        assert_eq!(
            api.base_url().join("clients").unwrap().as_str(),
            "http://localhost:8087/api/clients"
        );

        let nested = ApiClient::new("http://host/office").unwrap();
        assert_eq!(
            nested.base_url().join("cases/1").unwrap().as_str(),
            "http://host/office/api/cases/1"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::BaseUrl(_))
        ));
    }
}
