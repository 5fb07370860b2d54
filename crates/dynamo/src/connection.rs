//! Connection construction and per-application memoization.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use axum_dynamo_core::config::{endpoint_url, SessionParams, Settings};

use crate::backend::TableService;
use crate::error::Result;
use crate::registry::Table;
use crate::session::Session;

/// A live client handle for issuing table operations.
///
/// Cloning is cheap and clones share the same underlying client.
#[derive(Clone)]
pub struct Connection {
    service: Arc<dyn TableService>,
}

impl Connection {
    pub fn new(service: impl TableService + 'static) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &dyn TableService {
        self.service.as_ref()
    }

    /// Builds a handle for `table_name` on this connection.
    pub fn table(&self, table_name: impl Into<String>) -> Table {
        Table::new(self.clone(), table_name)
    }

    /// Returns true if both handles share the same underlying client.
    pub fn ptr_eq(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.service, &other.service)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Builds sessions and connections for the provider.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Builds a session from explicitly-set parameters only.
    async fn build_session(&self, params: &SessionParams) -> Result<Session>;

    /// Builds a connection on `session`, overriding the endpoint if given.
    fn connect(&self, session: &Session, endpoint_url: Option<&str>) -> Result<Connection>;
}

/// Lazily builds one session and one connection for a single scope (an
/// application) and hands out the cached instances afterwards.
///
/// Initialization is guarded, so concurrent first access still builds once.
pub struct ConnectionProvider {
    factory: Arc<dyn ConnectionFactory>,
    params: SessionParams,
    endpoint_url: Option<String>,
    preset_session: Option<Session>,
    session: OnceCell<Session>,
    connection: OnceCell<Connection>,
}

impl ConnectionProvider {
    /// Creates a provider for resolved `settings`.
    ///
    /// A `preset_session` is reused verbatim instead of building one.
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        settings: &Settings,
        preset_session: Option<Session>,
    ) -> Self {
        Self {
            factory,
            params: SessionParams::from_settings(settings),
            endpoint_url: endpoint_url(settings),
            preset_session,
            session: OnceCell::new(),
            connection: OnceCell::new(),
        }
    }

    /// The endpoint override, set only for a local endpoint.
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// The session, built on first access.
    pub async fn session(&self) -> Result<&Session> {
        self.session
            .get_or_try_init(|| async {
                match &self.preset_session {
                    Some(session) => {
                        tracing::debug!("Using pre-built DynamoDB session");
                        Ok(session.clone())
                    }
                    None => {
                        if self.params.ignores_session_token() {
                            tracing::warn!(
                                "Session token set without an access key pair, ignoring it"
                            );
                        }
                        tracing::debug!(params = ?self.params, "Building DynamoDB session");
                        self.factory.build_session(&self.params).await
                    }
                }
            })
            .await
    }

    /// The connection, built on first access.
    pub async fn connection(&self) -> Result<&Connection> {
        self.connection
            .get_or_try_init(|| async {
                let session = self.session().await?;
                let connection = self.factory.connect(session, self.endpoint_url())?;

                tracing::debug!(
                    region = session.region().unwrap_or("<default>"),
                    endpoint = self.endpoint_url().unwrap_or("<default>"),
                    "DynamoDB connection established"
                );

                Ok(connection)
            })
            .await
    }

    /// Returns true once the connection has been built.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }
}
