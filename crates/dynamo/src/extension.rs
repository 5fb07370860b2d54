//! Attaching the extension to a host application.
//!
//! State is explicit: [`Dynamo::init_app`] resolves the settings, connects,
//! and stores a [`DynamoState`] in the application's extension map. Handlers
//! receive the state through router state (see [`crate::Tables`]) instead of
//! looking it up from an ambient context.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum_dynamo_core::config::{process_env, resolve_and_validate, Settings};
use axum_dynamo_core::table::TableDescriptor;

use crate::backend::aws::AwsConnector;
use crate::connection::{Connection, ConnectionFactory, ConnectionProvider};
use crate::error::{DynamoError, Result};
use crate::registry::{Table, TableRegistry};
use crate::session::Session;

/// Key the extension state is stored under in an [`Application`].
pub const EXTENSION_KEY: &str = "dynamo";

type Extension = Arc<dyn Any + Send + Sync>;
type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Application-level configuration the extension reads.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub settings: Settings,
    /// Pre-built session, reused verbatim when set.
    pub session: Option<Session>,
}

/// The host application: a name, its configuration and its extensions.
pub struct Application {
    name: String,
    pub config: AppConfig,
    extensions: HashMap<&'static str, Extension>,
}

impl Application {
    pub fn new(name: impl Into<String>, config: AppConfig) -> Self {
        Self {
            name: name.into(),
            config,
            extensions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the extension stored under `key`, if it has type `T`.
    pub fn extension<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.extensions
            .get(key)
            .cloned()
            .and_then(|ext| ext.downcast::<T>().ok())
    }

    /// Stores `extension` under `key`, replacing any previous one.
    pub fn insert_extension<T: Any + Send + Sync>(&mut self, key: &'static str, extension: Arc<T>) {
        self.extensions.insert(key, extension);
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.extensions.keys().collect();
        keys.sort();
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("extensions", &keys)
            .finish()
    }
}

/// The extension entry point.
///
/// # Example
///
/// ```no_run
/// use axum_dynamo::{AppConfig, Application, Dynamo};
///
/// # async fn run() -> Result<(), axum_dynamo::DynamoError> {
/// let mut app = Application::new("api", AppConfig::default());
/// let state = Dynamo::new().init_app(&mut app).await?;
/// state.create_all(true).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Dynamo {
    factory: Arc<dyn ConnectionFactory>,
    env: EnvLookup,
}

impl Default for Dynamo {
    fn default() -> Self {
        Self {
            factory: Arc::new(AwsConnector),
            env: Arc::new(process_env),
        }
    }
}

impl Dynamo {
    /// Extension backed by the AWS SDK, with the process environment as fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `connector` to build sessions and connections.
    pub fn with_connector(mut self, connector: impl ConnectionFactory + 'static) -> Self {
        self.factory = Arc::new(connector);
        self
    }

    /// Uses `env` instead of the process environment for unset options.
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(env);
        self
    }

    /// Attaches the extension to `app`.
    ///
    /// Settings are resolved and validated before anything else, so an
    /// invalid configuration never reaches the network. The resolved settings
    /// are written back to `app.config`.
    pub async fn init_app(&self, app: &mut Application) -> Result<Arc<DynamoState>> {
        let mut settings = app.config.settings.clone();
        resolve_and_validate(&mut settings, self.env.as_ref())?;
        app.config.settings = settings.clone();

        let provider = ConnectionProvider::new(
            self.factory.clone(),
            &settings,
            app.config.session.clone(),
        );
        let connection = provider.connection().await?.clone();
        let tables = TableRegistry::new(connection, settings.tables().to_vec())
            .with_wait_timeout(settings.wait_timeout());

        tracing::info!(
            app = %app.name(),
            tables = ?tables.keys(),
            endpoint = provider.endpoint_url().unwrap_or("<default>"),
            "Dynamo extension initialized"
        );

        let state = Arc::new(DynamoState {
            settings,
            provider,
            tables,
        });
        app.insert_extension(EXTENSION_KEY, state.clone());

        Ok(state)
    }

    /// Returns the state attached to `app`.
    pub fn state_for(app: Option<&Application>) -> Result<Arc<DynamoState>> {
        let app = app.ok_or(DynamoError::NoApplication)?;
        app.extension::<DynamoState>(EXTENSION_KEY)
            .ok_or_else(|| DynamoError::NotRegistered {
                app: app.name().to_string(),
            })
    }
}

impl fmt::Debug for Dynamo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamo").finish_non_exhaustive()
    }
}

/// Per-application extension state.
pub struct DynamoState {
    settings: Settings,
    provider: ConnectionProvider,
    tables: TableRegistry,
}

impl DynamoState {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The application's connection, shared by every table handle.
    pub fn connection(&self) -> &Connection {
        self.tables.connection()
    }

    pub async fn session(&self) -> Result<&Session> {
        self.provider.session().await
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    /// Returns a handle for a configured table.
    pub fn get_table(&self, name: &str) -> Result<Table> {
        self.tables
            .lookup(name)
            .map_err(|_| DynamoError::NoSuchTable(name.to_string()))
    }

    /// Returns the descriptor of a configured table.
    pub fn get_descriptor(&self, name: &str) -> Result<&TableDescriptor> {
        self.tables
            .descriptor(name)
            .map_err(|_| DynamoError::NoSuchTable(name.to_string()))
    }

    pub async fn create_all(&self, wait: bool) -> Result<Vec<String>> {
        self.tables.create_all(wait).await
    }

    pub async fn destroy_all(&self, wait: bool) -> Result<Vec<String>> {
        self.tables.destroy_all(wait).await
    }
}

impl fmt::Debug for DynamoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamoState")
            .field("settings", &self.settings)
            .field("tables", &self.tables.keys())
            .field("endpoint_url", &self.provider.endpoint_url())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryConnector;
    use crate::backend::TableService;
    use axum_dynamo_core::config::ConfigError;
    use axum_dynamo_core::table::AttributeType;
    use aws_config::SdkConfig;
    use std::collections::HashMap;

    fn users() -> TableDescriptor {
        TableDescriptor::new("users")
            .hash_key("username", AttributeType::S)
            .throughput(5, 5)
    }

    fn app(settings: Settings) -> Application {
        Application::new(
            "test",
            AppConfig {
                settings,
                session: None,
            },
        )
    }

    fn dynamo(connector: &MemoryConnector) -> Dynamo {
        Dynamo::new()
            .with_connector(connector.clone())
            .with_env(|_| None)
    }

    #[tokio::test]
    async fn test_valid_configurations_attach() {
        let mut with_token = Settings::default().with_credentials("k", "s");
        with_token.session_token = Some("t".to_string());
        let valid = [
            Settings::default(),
            Settings::default().with_credentials("k", "s"),
            with_token,
            Settings::default().with_local("localhost", 8000),
            Settings::default()
                .with_local("localhost", 8000)
                .with_credentials("k", "s"),
        ];

        for settings in valid {
            let connector = MemoryConnector::new();
            let mut app = app(settings.clone());

            let result = dynamo(&connector).init_app(&mut app).await;

            assert!(result.is_ok(), "{:?} should attach", settings);
            assert_eq!(connector.endpoints().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_access_key_without_secret_fails_before_connecting() {
        let connector = MemoryConnector::new();
        let mut settings = Settings::default();
        settings.access_key_id = Some("k".to_string());
        let mut app = app(settings);

        let err = dynamo(&connector).init_app(&mut app).await.unwrap_err();

        assert!(matches!(
            err,
            DynamoError::Config(ConfigError::MissingSecretAccessKey)
        ));
        assert!(connector.sessions_built().is_empty());
        assert!(connector.endpoints().is_empty());
        assert!(app.extension::<DynamoState>(EXTENSION_KEY).is_none());
    }

    #[tokio::test]
    async fn test_secret_without_access_key_fails() {
        let connector = MemoryConnector::new();
        let mut settings = Settings::default();
        settings.secret_access_key = Some("s".to_string());

        let err = dynamo(&connector)
            .init_app(&mut app(settings))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DynamoError::Config(ConfigError::MissingAccessKeyId)
        ));
        assert!(connector.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_local_without_host_and_port_fails() {
        let connector = MemoryConnector::new();
        let mut settings = Settings::default();
        settings.enable_local = Some(true);

        let err = dynamo(&connector)
            .init_app(&mut app(settings))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DynamoError::Config(ConfigError::LocalEndpointIncomplete)
        ));
        assert!(connector.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_local_users_table_scenario() {
        let connector = MemoryConnector::new();
        let settings = Settings::default()
            .with_tables(vec![users()])
            .with_local("localhost", 8000);
        let mut app = app(settings);

        let state = dynamo(&connector).init_app(&mut app).await.unwrap();

        assert_eq!(
            connector.endpoints(),
            vec![Some("http://localhost:8000".to_string())]
        );

        state.create_all(true).await.unwrap();

        assert_eq!(
            connector.backend().list_tables().await.unwrap(),
            vec!["users"]
        );
        assert_eq!(state.tables().keys(), vec!["users"]);
    }

    #[tokio::test]
    async fn test_environment_fills_unset_options() {
        let connector = MemoryConnector::new();
        let env: HashMap<&str, &str> = HashMap::from([
            ("DYNAMO_ENABLE_LOCAL", "true"),
            ("DYNAMO_LOCAL_HOST", "dynamo"),
            ("DYNAMO_LOCAL_PORT", "8001"),
            ("AWS_REGION", "eu-central-1"),
        ]);
        let dynamo = Dynamo::new()
            .with_connector(connector.clone())
            .with_env(move |key: &str| env.get(key).map(|v| v.to_string()));
        let mut app = app(Settings::default().with_region("us-west-2"));

        let state = dynamo.init_app(&mut app).await.unwrap();

        assert_eq!(state.settings().region(), Some("us-west-2"));
        assert_eq!(app.config.settings.local_host(), Some("dynamo"));
        assert_eq!(app.config.settings.local_port(), Some(8001));
        assert_eq!(
            connector.endpoints(),
            vec![Some("http://dynamo:8001".to_string())]
        );
        assert_eq!(
            connector.sessions_built()[0].region.as_deref(),
            Some("us-west-2")
        );
    }

    #[tokio::test]
    async fn test_region_defaults_when_unset() {
        let connector = MemoryConnector::new();
        let mut app = app(Settings::default());

        dynamo(&connector).init_app(&mut app).await.unwrap();

        assert_eq!(app.config.settings.region(), Some("us-east-1"));
        assert_eq!(connector.endpoints(), vec![None]);
    }

    #[tokio::test]
    async fn test_preset_session_is_used() {
        let connector = MemoryConnector::new();
        let mut app = Application::new(
            "preset",
            AppConfig {
                settings: Settings::default(),
                session: Some(Session::new(
                    SdkConfig::builder()
                        .region(aws_config::Region::new("ap-south-1"))
                        .build(),
                )),
            },
        );

        let state = dynamo(&connector).init_app(&mut app).await.unwrap();

        assert_eq!(state.session().await.unwrap().region(), Some("ap-south-1"));
        assert!(connector.sessions_built().is_empty());
    }

    #[tokio::test]
    async fn test_state_for_registered_application() {
        let connector = MemoryConnector::new();
        let mut app = app(Settings::default());
        let state = dynamo(&connector).init_app(&mut app).await.unwrap();

        let resolved = Dynamo::state_for(Some(&app)).unwrap();

        assert!(Arc::ptr_eq(&state, &resolved));
        assert!(resolved.connection().ptr_eq(state.connection()));
    }

    #[test]
    fn test_state_for_without_application() {
        assert!(matches!(
            Dynamo::state_for(None),
            Err(DynamoError::NoApplication)
        ));
    }

    #[test]
    fn test_state_for_unregistered_application() {
        let app = Application::new("bare", AppConfig::default());

        match Dynamo::state_for(Some(&app)) {
            Err(DynamoError::NotRegistered { app }) => assert_eq!(app, "bare"),
            other => panic!("expected NotRegistered, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_applications_do_not_share_connections() {
        let connector = MemoryConnector::new();
        let dynamo = dynamo(&connector);
        let mut first = app(Settings::default());
        let mut second = app(Settings::default());

        let a = dynamo.init_app(&mut first).await.unwrap();
        let b = dynamo.init_app(&mut second).await.unwrap();

        assert!(a.connection().ptr_eq(a.connection()));
        assert!(!a.connection().ptr_eq(b.connection()));
        assert_eq!(connector.sessions_built().len(), 2);
    }

    #[tokio::test]
    async fn test_get_table() {
        let connector = MemoryConnector::new();
        let mut app = app(Settings::default().with_tables(vec![users()]));
        let state = dynamo(&connector).init_app(&mut app).await.unwrap();

        assert_eq!(state.get_table("users").unwrap().name(), "users");
        assert_eq!(
            state.get_descriptor("users").unwrap().hash_key_name(),
            Some("username")
        );
        assert!(matches!(
            state.get_descriptor("groups"),
            Err(DynamoError::NoSuchTable(_))
        ));
        match state.get_table("groups") {
            Err(DynamoError::NoSuchTable(name)) => assert_eq!(name, "groups"),
            other => panic!("expected NoSuchTable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_destroy_all_twice_fails() {
        let connector = MemoryConnector::new();
        let mut app = app(Settings::default().with_tables(vec![users()]));
        let state = dynamo(&connector).init_app(&mut app).await.unwrap();

        state.create_all(true).await.unwrap();
        state.create_all(true).await.unwrap();
        state.destroy_all(true).await.unwrap();

        assert!(matches!(
            state.destroy_all(true).await,
            Err(DynamoError::Service { .. })
        ));
    }
}
