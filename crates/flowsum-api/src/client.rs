// Controller HTTP client
//
// Wraps `reqwest::Client` with URL construction, token injection and
// response decoding. Endpoint groups (auth, sites, appdefs, flows) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Header carrying the session token on every authenticated request.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Raw HTTP client for the controller's REST API.
///
/// Holds the session token (if token auth is used) and the tenant id
/// bound by a successful login. Tenant-scoped endpoints fail with
/// [`Error::NotAuthenticated`] until a tenant is bound.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    tenant_id: Option<String>,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: None,
            tenant_id: None,
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The tenant bound by the last successful authentication.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tenant_id.is_some()
    }

    // ── Session state ─────────────────────────────────────────────────

    pub(crate) fn set_token(&mut self, token: SecretString) {
        debug!("storing session token");
        self.token = Some(token);
    }

    pub(crate) fn bind_tenant(&mut self, tenant_id: String) {
        debug!(%tenant_id, "tenant bound");
        self.tenant_id = Some(tenant_id);
    }

    pub(crate) fn clear_session(&mut self) {
        self.token = None;
        self.tenant_id = None;
    }

    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a controller-level path, e.g. `v2.0/api/login`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    /// Build a tenant-scoped URL: `{base}/{version}/api/tenants/{tenant}/{path}`.
    pub(crate) fn tenant_url(&self, version: &str, path: &str) -> Result<Url, Error> {
        let tenant = self.tenant_id.as_deref().ok_or(Error::NotAuthenticated)?;
        self.api_url(&format!("{version}/api/tenants/{tenant}/{path}"))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .apply_token(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_json(resp).await
    }

    /// Send a POST request with JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .apply_token(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_json(resp).await
    }

    /// Send a GET request, checking the status but discarding the body.
    pub(crate) async fn get_empty(&self, url: Url) -> Result<(), Error> {
        debug!("GET {}", url);

        let resp = self
            .apply_token(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(status_error(status, &body))
        }
    }

    /// Map the HTTP status and decode the body on success.
    ///
    /// 401 becomes [`Error::Authentication`]; any other non-2xx becomes
    /// [`Error::Api`] carrying the first `_error` entry if present.
    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> Error {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let first = parsed.errors.into_iter().next();
    let code = first.as_ref().and_then(|e| e.code.clone());
    let message = first
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {status}: {}", preview(body)));

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Authentication { message };
    }

    Error::Api {
        message,
        code,
        status: status.as_u16(),
    }
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_joins_without_double_slash() {
        let c = client("https://controller.example.com/");
        assert_eq!(
            c.api_url("/v2.0/api/login").unwrap().as_str(),
            "https://controller.example.com/v2.0/api/login"
        );
    }

    #[test]
    fn api_url_keeps_base_path_prefix() {
        let c = client("https://proxy.example.com/cg");
        assert_eq!(
            c.api_url("v2.1/api/profile").unwrap().as_str(),
            "https://proxy.example.com/cg/v2.1/api/profile"
        );
    }

    #[test]
    fn tenant_url_requires_a_bound_tenant() {
        let mut c = client("https://controller.example.com");
        assert!(matches!(
            c.tenant_url("v4.7", "sites"),
            Err(Error::NotAuthenticated)
        ));

        c.bind_tenant("1234".into());
        assert_eq!(
            c.tenant_url("v4.7", "sites").unwrap().as_str(),
            "https://controller.example.com/v4.7/api/tenants/1234/sites"
        );
    }

    #[test]
    fn status_error_prefers_structured_message() {
        let body = r#"{"_error":[{"code":"FLOW_QUERY_INVALID","message":"bad window"}]}"#;
        let err = status_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(
            &err,
            Error::Api { status: 400, message, .. } if message == "bad window"
        ));
        assert_eq!(err.api_error_code(), Some("FLOW_QUERY_INVALID"));
    }

    #[test]
    fn unauthorized_maps_to_authentication() {
        let err = status_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(err.is_auth());
    }

    #[test]
    fn preview_never_splits_a_char() {
        let body = "é".repeat(150);
        let p = preview(&body);
        assert!(p.len() <= 200);
        assert!(p.chars().all(|c| c == 'é'));
    }
}
