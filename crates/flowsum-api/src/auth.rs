// Session authentication
//
// Two ways in: a pre-issued token sent as `X-Auth-Token`, or an
// email/password login that returns a token (or a session cookie).
// Either way the session is only considered valid once the operator
// profile reports a tenant id.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{LoginResponse, OperatorProfile};

const LOGIN_PATH: &str = "v2.0/api/login";
const LOGOUT_PATH: &str = "v2.0/api/logout";
const PROFILE_PATH: &str = "v2.1/api/profile";

impl ApiClient {
    /// Authenticate with a pre-issued token.
    ///
    /// The token is validated by fetching the operator profile; a profile
    /// without a tenant id is treated as a rejected token.
    pub async fn use_token(&mut self, token: SecretString) -> Result<OperatorProfile, Error> {
        self.set_token(token);
        self.bind_profile().await
    }

    /// Authenticate with email and password.
    ///
    /// `POST /v2.0/api/login`. Any token in the response is attached to
    /// subsequent requests; cookie sessions ride along in the jar.
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<OperatorProfile, Error> {
        let url = self.api_url(LOGIN_PATH)?;

        debug!("logging in at {}", url);

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let login: LoginResponse = resp.json().await.map_err(Error::Transport)?;
        if let Some(token) = login.x_auth_token {
            self.set_token(SecretString::from(token));
        }

        self.bind_profile().await
    }

    /// Fetch the operator profile for the current session.
    ///
    /// `GET /v2.1/api/profile`
    pub async fn profile(&self) -> Result<OperatorProfile, Error> {
        let url = self.api_url(PROFILE_PATH)?;
        self.get(url).await
    }

    /// End the current session and forget the token and tenant.
    ///
    /// `GET /v2.0/api/logout`
    pub async fn logout(&mut self) -> Result<(), Error> {
        let url = self.api_url(LOGOUT_PATH)?;

        debug!("logging out at {}", url);

        let result = self.get_empty(url).await;
        self.clear_session();

        debug!("logout complete");
        result
    }

    async fn bind_profile(&mut self) -> Result<OperatorProfile, Error> {
        let profile = self.profile().await?;
        let Some(tenant_id) = profile.tenant_id.clone() else {
            self.clear_session();
            return Err(Error::Authentication {
                message: "profile has no tenant -- credential rejected".into(),
            });
        };
        self.bind_tenant(tenant_id);
        Ok(profile)
    }
}
