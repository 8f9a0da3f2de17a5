// Async HTTP client for the DID provisioning backend.
//
// Base path: configurable (e.g. https://api.example.com/v1/)
// Auth: optional `Authorization: Bearer <token>` header

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    HealthReport, ProvisionRequest, RawCustomer, RawDid, RawList, RawOne, RawRecord, SearchQuery,
    UpdateDidRequest,
};

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default, alias = "error", alias = "detail")]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the provisioning backend.
///
/// Read-only calls (`search`, `list_dids`, `health`, `list_customers`) get
/// exactly one automatic retry on transient failure. Mutations are never
/// retried.
#[derive(Debug, Clone)]
pub struct DidClient {
    http: reqwest::Client,
    base_url: Url,
    /// Per-request timeout, when known. Lets a timeout report its budget.
    timeout: Option<Duration>,
}

impl DidClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, an optional bearer token, and transport config.
    ///
    /// The token is marked sensitive so it never appears in debug output.
    pub fn new(
        base_url: &str,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|e| Error::MalformedToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: None,
        })
    }

    /// Apply a per-request timeout on top of whatever the wrapped client
    /// already enforces.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        request.send().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if e.is_timeout() => Error::Timeout { timeout },
            _ => Error::Transport(e),
        }
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.send(self.http.get(url).query(params)).await?;
        self.handle_response(resp).await
    }

    /// GET with a single retry on transient failure.
    async fn get_idle<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        match self.get_with_params(path, params).await {
            Err(e) if e.is_transient() => {
                warn!(error = %e, "GET {path} failed, retrying once");
                self.get_with_params(path, params).await
            }
            other => other,
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url).json(body)).await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.send(self.http.delete(url)).await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await.map_err(|e| self.transport_error(e))?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Error::InvalidToken;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Remote {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Remote {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── DIDs ─────────────────────────────────────────────────────────

    /// `GET /dids/search` -- available numbers, in backend order.
    ///
    /// Records are decoded lazily; see [`RawRecord`].
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<RawRecord<RawDid>>, Error> {
        let list: RawList<RawRecord<RawDid>> =
            self.get_idle("dids/search", &query.to_params()).await?;
        Ok(list.into_vec())
    }

    /// `POST /dids` -- provision (purchase) a number.
    pub async fn provision(&self, request: &ProvisionRequest) -> Result<RawDid, Error> {
        let one: RawOne<RawDid> = self.post("dids", request).await?;
        Ok(one.into_inner())
    }

    /// `GET /dids` -- numbers owned by the caller.
    pub async fn list_dids(&self) -> Result<Vec<RawRecord<RawDid>>, Error> {
        let list: RawList<RawRecord<RawDid>> = self.get_idle("dids", &[]).await?;
        Ok(list.into_vec())
    }

    /// `PUT /dids/{id}` -- partial configuration update.
    pub async fn update_did(&self, id: &str, request: &UpdateDidRequest) -> Result<RawDid, Error> {
        let one: RawOne<RawDid> = self.put(&format!("dids/{id}"), request).await?;
        Ok(one.into_inner())
    }

    /// `DELETE /dids/{id}` -- release a number.
    pub async fn release_did(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("dids/{id}")).await
    }

    // ── Supporting data ──────────────────────────────────────────────

    /// `GET /health` -- liveness probe.
    ///
    /// Any 2xx is healthy. A body that isn't the expected JSON is ignored.
    pub async fn health(&self) -> Result<HealthReport, Error> {
        match self.get_idle::<HealthReport>("health", &[]).await {
            Err(Error::Deserialization { .. }) => Ok(HealthReport::default()),
            other => other,
        }
    }

    /// `GET /customers`
    pub async fn list_customers(&self) -> Result<Vec<RawRecord<RawCustomer>>, Error> {
        let list: RawList<RawRecord<RawCustomer>> = self.get_idle("customers", &[]).await?;
        Ok(list.into_vec())
    }
}
