// Directory endpoints
//
// Sites and application definitions are tenant-scoped collections
// returned in the standard `{ items: [...] }` envelope.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AppDef, ItemsResponse, Site};

impl ApiClient {
    /// List all sites in the tenant.
    ///
    /// `GET /v4.7/api/tenants/{tenant}/sites`
    pub async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        let url = self.tenant_url("v4.7", "sites")?;
        debug!("listing sites");
        let resp: ItemsResponse<Site> = self.get(url).await?;
        Ok(resp.into_items())
    }

    /// List application definitions (system and custom).
    ///
    /// `GET /v2.3/api/tenants/{tenant}/appdefs`
    pub async fn list_appdefs(&self) -> Result<Vec<AppDef>, Error> {
        let url = self.tenant_url("v2.3", "appdefs")?;
        debug!("listing application definitions");
        let resp: ItemsResponse<AppDef> = self.get(url).await?;
        Ok(resp.into_items())
    }
}
