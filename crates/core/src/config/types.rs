use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::table::TableDescriptor;

use super::env::DEFAULT_WAIT_TIMEOUT_SECS;

/// Extension settings as stored on the host application.
///
/// Every option is optional so that "explicitly set" and "absent" stay
/// distinguishable: absent options are filled from the environment by
/// [`Settings::apply_defaults`], and absent credentials are never forwarded to
/// the SDK. Empty strings count as absent.
///
/// Field names deserialize from the configuration keys (`DYNAMO_TABLES`,
/// `AWS_REGION`, ...).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "DYNAMO_TABLES")]
    pub tables: Option<Vec<TableDescriptor>>,
    #[serde(rename = "DYNAMO_ENABLE_LOCAL")]
    pub enable_local: Option<bool>,
    #[serde(rename = "DYNAMO_LOCAL_HOST")]
    pub local_host: Option<String>,
    #[serde(rename = "DYNAMO_LOCAL_PORT")]
    pub local_port: Option<u16>,
    #[serde(rename = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,
    #[serde(rename = "AWS_SESSION_TOKEN")]
    pub session_token: Option<String>,
    #[serde(rename = "AWS_REGION")]
    pub region: Option<String>,
    #[serde(rename = "DYNAMO_WAIT_TIMEOUT_SECS")]
    pub wait_timeout_secs: Option<u64>,
}

impl Settings {
    /// Sets the configured tables.
    pub fn with_tables(mut self, tables: Vec<TableDescriptor>) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Points the extension at a local DynamoDB endpoint.
    pub fn with_local(mut self, host: impl Into<String>, port: u16) -> Self {
        self.enable_local = Some(true);
        self.local_host = Some(host.into());
        self.local_port = Some(port);
        self
    }

    /// Sets static credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        self.tables.as_deref().unwrap_or_default()
    }

    pub fn enable_local(&self) -> bool {
        self.enable_local.unwrap_or(false)
    }

    pub fn local_host(&self) -> Option<&str> {
        non_empty(&self.local_host)
    }

    pub fn local_port(&self) -> Option<u16> {
        self.local_port
    }

    pub fn access_key_id(&self) -> Option<&str> {
        non_empty(&self.access_key_id)
    }

    pub fn secret_access_key(&self) -> Option<&str> {
        non_empty(&self.secret_access_key)
    }

    pub fn session_token(&self) -> Option<&str> {
        non_empty(&self.session_token)
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    /// Maximum time to block in `create_all`/`destroy_all` waits.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs.unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS))
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tables", &self.tables)
            .field("enable_local", &self.enable_local)
            .field("local_host", &self.local_host)
            .field("local_port", &self.local_port)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("wait_timeout_secs", &self.wait_timeout_secs)
            .finish()
    }
}
