mod env;
mod error;
mod session;
mod types;
mod validation;

pub use env::{
    process_env, AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN,
    DEFAULT_REGION, DEFAULT_WAIT_TIMEOUT_SECS, DYNAMO_ENABLE_LOCAL, DYNAMO_LOCAL_HOST,
    DYNAMO_LOCAL_PORT, DYNAMO_TABLES, DYNAMO_WAIT_TIMEOUT_SECS,
};
pub use error::ConfigError;
pub use session::{endpoint_url, SessionParams};
pub use types::Settings;
pub use validation::resolve_and_validate;
