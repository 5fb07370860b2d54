use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{describe_table, get_item, list_tables, put_item},
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/{name}", get(describe_table))
        .route("/tables/{name}/items", axum::routing::post(put_item))
        .route("/tables/{name}/items/{key}", get(get_item))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use axum_dynamo::backend::memory::MemoryConnector;
    use axum_dynamo::{
        AppConfig, Application, AttributeType, Connection, ConnectionFactory, Dynamo, DynamoError,
        Item, Session, SessionParams, Settings, TableDescriptor, TableService, TableStatus,
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    /// Answers every DescribeTable call with a throttling error.
    struct ThrottledService;

    #[async_trait]
    impl TableService for ThrottledService {
        async fn list_tables(&self) -> axum_dynamo::Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn create_table(&self, _descriptor: &TableDescriptor) -> axum_dynamo::Result<()> {
            Ok(())
        }

        async fn delete_table(&self, _table_name: &str) -> axum_dynamo::Result<()> {
            Ok(())
        }

        async fn describe_table(&self, _table_name: &str) -> axum_dynamo::Result<TableStatus> {
            Err(DynamoError::service(
                "DescribeTable",
                std::io::Error::other("ThrottlingException"),
            ))
        }

        async fn wait_until_exists(
            &self,
            _table_name: &str,
            _max_wait: Duration,
        ) -> axum_dynamo::Result<()> {
            Ok(())
        }

        async fn wait_until_not_exists(
            &self,
            _table_name: &str,
            _max_wait: Duration,
        ) -> axum_dynamo::Result<()> {
            Ok(())
        }

        async fn put_item(&self, _table_name: &str, _item: Item) -> axum_dynamo::Result<()> {
            Ok(())
        }

        async fn get_item(&self, _table_name: &str, _key: Item) -> axum_dynamo::Result<Option<Item>> {
            Ok(None)
        }

        async fn delete_item(&self, _table_name: &str, _key: Item) -> axum_dynamo::Result<()> {
            Ok(())
        }
    }

    struct ThrottledConnector(MemoryConnector);

    #[async_trait]
    impl ConnectionFactory for ThrottledConnector {
        async fn build_session(&self, params: &SessionParams) -> axum_dynamo::Result<Session> {
            self.0.build_session(params).await
        }

        fn connect(
            &self,
            _session: &Session,
            _endpoint_url: Option<&str>,
        ) -> axum_dynamo::Result<Connection> {
            Ok(Connection::new(ThrottledService))
        }
    }

    fn test_settings() -> Settings {
        Settings::default().with_tables(vec![
            TableDescriptor::new("users").hash_key("username", AttributeType::S),
            TableDescriptor::new("events")
                .hash_key("PK", AttributeType::S)
                .range_key("SK", AttributeType::N),
        ])
    }

    async fn test_state(create_tables: bool) -> AppState {
        let settings = test_settings();
        let mut app = Application::new(
            "demo-test",
            AppConfig {
                settings,
                session: None,
            },
        );

        let dynamo = Dynamo::new()
            .with_connector(MemoryConnector::new())
            .with_env(|_| None)
            .init_app(&mut app)
            .await
            .unwrap();
        if create_tables {
            dynamo.create_all(true).await.unwrap();
        }

        AppState::new(dynamo)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, value: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_tables_before_creation() {
        let app = create_app(test_state(false).await);

        let response = app
            .oneshot(Request::builder().uri("/tables").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!([
                {"name": "users", "status": null},
                {"name": "events", "status": null},
            ])
        );
    }

    #[tokio::test]
    async fn test_list_tables_fails_on_service_error() {
        let mut app = Application::new(
            "demo-test",
            AppConfig {
                settings: test_settings(),
                session: None,
            },
        );
        let dynamo = Dynamo::new()
            .with_connector(ThrottledConnector(MemoryConnector::new()))
            .with_env(|_| None)
            .init_app(&mut app)
            .await
            .unwrap();
        let app = create_app(AppState::new(dynamo));

        let response = app
            .oneshot(Request::builder().uri("/tables").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_get_item_on_unknown_table_is_not_found() {
        let app = create_app(test_state(true).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tables/groups/items/ada")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_describe_table() {
        let app = create_app(test_state(true).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tables/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"name": "users", "status": "ACTIVE"})
        );
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let app = create_app(test_state(true).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tables/groups")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_and_get_item() {
        let app = create_app(test_state(true).await);

        let response = app
            .clone()
            .oneshot(post_json(
                "/tables/users/items",
                json!({"username": "ada", "age": 36}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/tables/users/items/ada")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"username": "ada", "age": 36})
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tables/users/items/bob")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_item_with_sort_key() {
        let app = create_app(test_state(true).await);

        app.clone()
            .oneshot(post_json(
                "/tables/events/items",
                json!({"PK": "cal#1", "SK": 20, "title": "Standup"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/tables/events/items/cal%231?sort=20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["title"], "Standup");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tables/events/items/cal%231")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_non_object_is_bad_request() {
        let app = create_app(test_state(true).await);

        let response = app
            .oneshot(post_json("/tables/users/items", json!(["ada"])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
