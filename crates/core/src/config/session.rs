use std::fmt;

use super::types::Settings;

/// Parameters forwarded to session construction.
///
/// A field is `Some` only when the corresponding option was explicitly set.
/// Omitted credentials let the SDK's default chain (environment, profile,
/// instance metadata) find them instead.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionParams {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub region: Option<String>,
}

impl SessionParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            access_key_id: settings.access_key_id().map(str::to_string),
            secret_access_key: settings.secret_access_key().map(str::to_string),
            session_token: settings.session_token().map(str::to_string),
            region: settings.region().map(str::to_string),
        }
    }

    /// Returns the static credential pair, if both halves are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// True when a session token is set without the key pair it belongs to.
    ///
    /// Such a token cannot be used on its own and is not forwarded; the
    /// default credential chain applies instead.
    pub fn ignores_session_token(&self) -> bool {
        self.session_token.is_some() && self.static_credentials().is_none()
    }
}

impl fmt::Debug for SessionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionParams")
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
            .finish()
    }
}

/// Endpoint override for the client: `http://{host}:{port}` when local mode
/// is enabled, otherwise none (the service's default endpoint).
pub fn endpoint_url(settings: &Settings) -> Option<String> {
    if !settings.enable_local() {
        return None;
    }
    match (settings.local_host(), settings.local_port()) {
        (Some(host), Some(port)) => Some(format!("http://{host}:{port}")),
        _ => None,
    }
}
