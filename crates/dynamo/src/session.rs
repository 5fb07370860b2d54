use aws_config::SdkConfig;

/// Credentials, region and SDK defaults a connection is built from.
///
/// Either built by a [`crate::ConnectionFactory`] from the extension settings,
/// or supplied pre-built through `AppConfig::session`, in which case it is
/// used verbatim.
#[derive(Debug, Clone)]
pub struct Session {
    config: SdkConfig,
}

impl Session {
    pub fn new(config: SdkConfig) -> Self {
        Self { config }
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }
}

impl From<SdkConfig> for Session {
    fn from(config: SdkConfig) -> Self {
        Self::new(config)
    }
}
