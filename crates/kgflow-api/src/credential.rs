//! Credential descriptor: the single `baseUrl` setting plus a reachability probe.

use kgflow_core::{ConnectivityProbe, Credentials, Result, CREDENTIALS_NAME, DEFAULT_BASE_URL};
use serde::Serialize;
use tracing::info;

use crate::request::{endpoint, HttpRequest};
use crate::transport::Transport;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProperty {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub default: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub placeholder: &'static str,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub properties: Vec<CredentialProperty>,
    pub probe: ConnectivityProbe,
}

impl Default for CredentialDescriptor {
    fn default() -> Self {
        Self::new(ConnectivityProbe::default())
    }
}

impl CredentialDescriptor {
    pub fn new(probe: ConnectivityProbe) -> Self {
        Self {
            name: CREDENTIALS_NAME,
            display_name: "Graphiti API",
            properties: vec![CredentialProperty {
                display_name: "API Base URL",
                name: "baseUrl",
                kind: "string",
                default: DEFAULT_BASE_URL,
                description: "The base URL of the Graphiti server (e.g., http://localhost:8000 or http://graphiti.web.1:5000)",
                required: true,
                placeholder: DEFAULT_BASE_URL,
            }],
            probe,
        }
    }

    /// GET against the configured probe endpoint.
    pub fn test_request(&self, credentials: &Credentials) -> Result<HttpRequest> {
        let segments: &[&str] = match self.probe {
            ConnectivityProbe::Healthcheck => &["healthcheck"],
            ConnectivityProbe::Episodes => &["episodes", ""],
        };
        Ok(HttpRequest::get(endpoint(&credentials.base_url, segments)?))
    }

    /// Succeeds when the probe returns any 2xx response.
    pub async fn test(&self, transport: &dyn Transport, credentials: &Credentials) -> Result<()> {
        let req = self.test_request(credentials)?;
        transport.send(req).await?;
        info!("credentials ok: {} reachable via {}", credentials.base_url, self.probe.path());
        Ok(())
    }
}
