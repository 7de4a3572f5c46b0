use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const TEST_PASSWORD: &str = "correct horse";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = linkbox::build_app(pool.clone(), "test-secret");

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Sign up a user through the API and return (bearer token, user id).
    pub async fn signup(&self, username: &str, email: &str) -> (String, String) {
        let resp = self
            .post_json(
                "/auth/signup",
                &serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": TEST_PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = read_json(resp).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Send a GET request with an optional bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST request with a JSON body and an optional bearer token.
    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("POST", uri, body, token).await
    }

    /// Send a PATCH request with a JSON body and an optional bearer token.
    pub async fn patch_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("PATCH", uri, body, token).await
    }

    /// Send a DELETE request with an optional bearer token.
    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("DELETE");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }
}

/// Consume a response body as JSON.
pub async fn read_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
