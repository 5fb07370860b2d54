//! Environment fallback for unset options.

use std::str::FromStr;

use super::error::ConfigError;
use super::types::{non_empty, Settings};

pub const DYNAMO_TABLES: &str = "DYNAMO_TABLES";
pub const DYNAMO_ENABLE_LOCAL: &str = "DYNAMO_ENABLE_LOCAL";
pub const DYNAMO_LOCAL_HOST: &str = "DYNAMO_LOCAL_HOST";
pub const DYNAMO_LOCAL_PORT: &str = "DYNAMO_LOCAL_PORT";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
pub const DYNAMO_WAIT_TIMEOUT_SECS: &str = "DYNAMO_WAIT_TIMEOUT_SECS";

/// Region used when neither the settings nor the environment name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default upper bound for table readiness waits (60 polls of 2s).
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 120;

/// Reads a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl Settings {
    /// Load settings purely from the process environment.
    ///
    /// Environment variables:
    /// - `DYNAMO_TABLES` - JSON array of table descriptors (default: empty)
    /// - `DYNAMO_ENABLE_LOCAL` - `true`/`1` to use a local endpoint (default: false)
    /// - `DYNAMO_LOCAL_HOST`, `DYNAMO_LOCAL_PORT` - local endpoint
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN` - static credentials
    /// - `AWS_REGION` - region (default: "us-east-1")
    /// - `DYNAMO_WAIT_TIMEOUT_SECS` - readiness wait bound (default: 120)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        settings.apply_defaults(process_env)?;
        Ok(settings)
    }

    /// Fills every unset option from `env`, then from the literal default.
    ///
    /// Options that are already set are left untouched, so calling this again
    /// is a no-op.
    pub fn apply_defaults<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        if self.tables.is_none() {
            let tables = lookup(DYNAMO_TABLES)
                .map(|raw| {
                    serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                        key: DYNAMO_TABLES,
                        reason: e.to_string(),
                    })
                })
                .transpose()?;
            self.tables = Some(tables.unwrap_or_default());
        }

        if self.enable_local.is_none() {
            self.enable_local = Some(lookup(DYNAMO_ENABLE_LOCAL).is_some_and(|v| parse_flag(&v)));
        }

        fill_string(&mut self.local_host, lookup(DYNAMO_LOCAL_HOST));

        if self.local_port.is_none() {
            self.local_port = lookup(DYNAMO_LOCAL_PORT)
                .map(|v| parse_number(DYNAMO_LOCAL_PORT, &v))
                .transpose()?;
        }

        fill_string(&mut self.access_key_id, lookup(AWS_ACCESS_KEY_ID));
        fill_string(&mut self.secret_access_key, lookup(AWS_SECRET_ACCESS_KEY));
        fill_string(&mut self.session_token, lookup(AWS_SESSION_TOKEN));

        fill_string(&mut self.region, lookup(AWS_REGION));
        fill_string(&mut self.region, Some(DEFAULT_REGION.to_string()));

        if self.wait_timeout_secs.is_none() {
            self.wait_timeout_secs = Some(
                lookup(DYNAMO_WAIT_TIMEOUT_SECS)
                    .map(|v| parse_number(DYNAMO_WAIT_TIMEOUT_SECS, &v))
                    .transpose()?
                    .unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS),
            );
        }

        Ok(())
    }
}

fn fill_string(slot: &mut Option<String>, value: Option<String>) {
    if non_empty(slot).is_none() {
        if let Some(value) = value {
            *slot = Some(value);
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: format!("{value:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let mut settings = Settings::default();
        settings.apply_defaults(env_from(&[])).unwrap();

        assert_eq!(settings.tables, Some(vec![]));
        assert_eq!(settings.enable_local, Some(false));
        assert_eq!(settings.local_host, None);
        assert_eq!(settings.local_port, None);
        assert_eq!(settings.access_key_id, None);
        assert_eq!(settings.secret_access_key, None);
        assert_eq!(settings.session_token, None);
        assert_eq!(settings.region.as_deref(), Some(DEFAULT_REGION));
        assert_eq!(settings.wait_timeout_secs, Some(DEFAULT_WAIT_TIMEOUT_SECS));
    }

    #[test]
    fn test_environment_fills_unset_options() {
        let env = env_from(&[
            (DYNAMO_ENABLE_LOCAL, "TRUE"),
            (DYNAMO_LOCAL_HOST, "localhost"),
            (DYNAMO_LOCAL_PORT, "8000"),
            (AWS_ACCESS_KEY_ID, "AKID"),
            (AWS_SECRET_ACCESS_KEY, "secret"),
            (AWS_SESSION_TOKEN, "token"),
            (AWS_REGION, "eu-central-1"),
            (DYNAMO_WAIT_TIMEOUT_SECS, "30"),
        ]);

        let mut settings = Settings::default();
        settings.apply_defaults(env).unwrap();

        assert!(settings.enable_local());
        assert_eq!(settings.local_host(), Some("localhost"));
        assert_eq!(settings.local_port(), Some(8000));
        assert_eq!(settings.access_key_id(), Some("AKID"));
        assert_eq!(settings.secret_access_key(), Some("secret"));
        assert_eq!(settings.session_token(), Some("token"));
        assert_eq!(settings.region(), Some("eu-central-1"));
        assert_eq!(settings.wait_timeout_secs, Some(30));
    }

    #[test]
    fn test_explicit_values_win_over_environment() {
        let env = env_from(&[(AWS_REGION, "eu-central-1"), (DYNAMO_ENABLE_LOCAL, "1")]);

        let mut settings = Settings {
            region: Some("ap-south-1".to_string()),
            enable_local: Some(false),
            ..Default::default()
        };
        settings.apply_defaults(env).unwrap();

        assert_eq!(settings.region(), Some("ap-south-1"));
        assert!(!settings.enable_local());
    }

    #[test]
    fn test_apply_defaults_is_idempotent() {
        let mut settings = Settings::default();
        settings
            .apply_defaults(env_from(&[(AWS_REGION, "eu-west-1")]))
            .unwrap();
        let first = settings.clone();

        settings
            .apply_defaults(env_from(&[(AWS_REGION, "us-west-2")]))
            .unwrap();

        assert_eq!(settings, first);
    }

    #[test]
    fn test_empty_environment_values_are_ignored() {
        let env = env_from(&[(AWS_ACCESS_KEY_ID, ""), (AWS_REGION, "")]);

        let mut settings = Settings::default();
        settings.apply_defaults(env).unwrap();

        assert_eq!(settings.access_key_id, None);
        assert_eq!(settings.region.as_deref(), Some(DEFAULT_REGION));
    }

    #[test]
    fn test_unrecognized_flag_is_false() {
        let mut settings = Settings::default();
        settings
            .apply_defaults(env_from(&[(DYNAMO_ENABLE_LOCAL, "no")]))
            .unwrap();

        assert_eq!(settings.enable_local, Some(false));
    }

    #[test]
    fn test_invalid_port() {
        let mut settings = Settings::default();
        let err = settings
            .apply_defaults(env_from(&[(DYNAMO_LOCAL_PORT, "eight-thousand")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: DYNAMO_LOCAL_PORT,
                ..
            }
        ));
    }

    #[test]
    fn test_tables_from_json() {
        let json = r#"[{
            "TableName": "users",
            "KeySchema": [{"AttributeName": "username", "KeyType": "HASH"}],
            "AttributeDefinitions": [{"AttributeName": "username", "AttributeType": "S"}]
        }]"#;

        let mut settings = Settings::default();
        settings
            .apply_defaults(env_from(&[(DYNAMO_TABLES, json)]))
            .unwrap();

        assert_eq!(settings.tables().len(), 1);
        assert_eq!(settings.tables()[0].table_name, "users");
    }

    #[test]
    fn test_invalid_tables_json() {
        let mut settings = Settings::default();
        let err = settings
            .apply_defaults(env_from(&[(DYNAMO_TABLES, "not json")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: DYNAMO_TABLES,
                ..
            }
        ));
    }
}
