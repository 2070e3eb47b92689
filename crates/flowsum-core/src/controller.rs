// ── Controller session ──
//
// Owns the API client for one run: authenticates, serves the directory
// and flow-store traits over HTTP, and logs out. API errors are mapped
// per call site so a 503 while listing sites reads differently from a
// 503 on the flow query.

use tracing::{debug, info};

use flowsum_api::transport::{TlsMode, TransportConfig};
use flowsum_api::{ApiClient, FlowsRequest, OperatorProfile};

use crate::backend::{Directory, FlowQuery, FlowStore, Session};
use crate::config::{ControllerConfig, Credentials, TlsVerification};
use crate::error::CoreError;
use crate::model::{Entity, FlowRecord};

/// Who the session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub tenant_id: String,
    pub email: Option<String>,
}

impl Operator {
    fn from_profile(profile: OperatorProfile) -> Result<Self, CoreError> {
        let tenant_id = profile
            .tenant_id
            .ok_or_else(|| CoreError::AuthenticationFailed {
                message: "profile has no tenant".into(),
            })?;
        Ok(Self {
            tenant_id,
            email: profile.email,
        })
    }
}

/// An API client plus the session bound to it.
pub struct Controller {
    config: ControllerConfig,
    client: ApiClient,
    operator: Option<Operator>,
}

impl Controller {
    /// Build an unauthenticated controller. No network activity.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ApiClient::new(config.url.clone(), &transport)?;
        Ok(Self {
            config,
            client,
            operator: None,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.operator.is_some()
    }

    /// Establish a session. A failed attempt leaves the controller
    /// unauthenticated, so callers may retry with new credentials.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<&Operator, CoreError> {
        let profile = match credentials {
            Credentials::Token(token) => {
                debug!("authenticating with token");
                self.client.use_token(token.clone()).await?
            }
            Credentials::Password { email, password } => {
                debug!(%email, "authenticating with password");
                self.client.login(email, password).await?
            }
        };

        let operator = Operator::from_profile(profile)?;
        info!(
            tenant_id = %operator.tenant_id,
            email = operator.email.as_deref().unwrap_or("-"),
            "authenticated"
        );
        Ok(self.operator.insert(operator))
    }
}

impl Directory for Controller {
    async fn list_sites(&self) -> Result<Vec<Entity>, CoreError> {
        let sites = self
            .client
            .list_sites()
            .await
            .map_err(|e| CoreError::directory("site", e))?;
        debug!(count = sites.len(), "sites listed");
        Ok(sites.into_iter().map(Entity::from).collect())
    }

    async fn list_applications(&self) -> Result<Vec<Entity>, CoreError> {
        let apps = self
            .client
            .list_appdefs()
            .await
            .map_err(|e| CoreError::directory("application", e))?;
        debug!(count = apps.len(), "applications listed");
        Ok(apps.into_iter().map(Entity::from).collect())
    }
}

impl FlowStore for Controller {
    async fn query_flows(&self, query: &FlowQuery) -> Result<Vec<FlowRecord>, CoreError> {
        let request = FlowsRequest::from(query);
        let flows = self
            .client
            .query_flows(&request)
            .await
            .map_err(CoreError::query)?;
        Ok(flows.into_iter().map(FlowRecord::from).collect())
    }
}

impl Session for Controller {
    /// Close the session. A no-op when nothing was established.
    async fn logout(&mut self) -> Result<(), CoreError> {
        if self.operator.take().is_none() {
            debug!("no session to close");
            return Ok(());
        }
        self.client.logout().await?;
        info!("logged out");
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
