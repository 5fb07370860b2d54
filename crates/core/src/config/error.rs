use thiserror::Error;

/// Raised when the extension settings are inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You must specify AWS_SECRET_ACCESS_KEY if you are specifying AWS_ACCESS_KEY_ID")]
    MissingSecretAccessKey,

    #[error("You must specify AWS_ACCESS_KEY_ID if you are specifying AWS_SECRET_ACCESS_KEY")]
    MissingAccessKeyId,

    #[error("If you have enabled Dynamo local, you must specify DYNAMO_LOCAL_HOST and DYNAMO_LOCAL_PORT")]
    LocalEndpointIncomplete,

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
