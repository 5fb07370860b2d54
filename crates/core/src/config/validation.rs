use super::error::ConfigError;
use super::types::Settings;

impl Settings {
    /// Checks the mutually-dependent options.
    ///
    /// - static credentials need both the access key and the secret;
    /// - a local endpoint needs both host and port.
    ///
    /// A session token without the key pair passes, but is ignored when the
    /// session is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.access_key_id(), self.secret_access_key()) {
            (Some(_), None) => return Err(ConfigError::MissingSecretAccessKey),
            (None, Some(_)) => return Err(ConfigError::MissingAccessKeyId),
            _ => {}
        }

        if self.enable_local() && (self.local_host().is_none() || self.local_port().is_none()) {
            return Err(ConfigError::LocalEndpointIncomplete);
        }

        Ok(())
    }
}

/// Fills unset options from `env` and validates the result.
///
/// Runs once when the extension is attached; repeating it with already
/// populated settings changes nothing.
pub fn resolve_and_validate<F>(settings: &mut Settings, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    settings.apply_defaults(env)?;
    settings.validate()
}
