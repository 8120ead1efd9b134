//! HTTP Surface Tests
//!
//! Drives the assembled router end to end with in-process requests.
//!
//! ## Test Scopes
//! - **Feedback routes**: Status codes and bodies of every read endpoint.
//! - **Auth routes**: Signup/signin over the in-memory store.
//! - **Fallbacks**: Unknown routes, malformed bodies, handler panics and CORS.

#[cfg(test)]
mod tests {
    use crate::auth::password::MIN_COST;
    use crate::auth::service::AuthService;
    use crate::auth::store::MemoryUserStore;
    use crate::feedback::types::{FeedbackDataset, FeedbackRecord};
    use crate::server::{build_router, catch_panic_layer};

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const ORIGIN: &str = "https://nissan-frontend.onrender.com";

    fn dataset() -> FeedbackDataset {
        let row = |model: &str, date: &str, fact: &str, feature: &str| {
            FeedbackRecord::from_pairs([
                ("model", model),
                ("brand", "Nissan"),
                ("date", date),
                ("fact", fact),
                ("Feature", feature),
            ])
        };

        FeedbackDataset::new(vec![
            row("Altima", "2024-01-05", "positive", "brakes"),
            row("Rogue", "2024-01-05", "negative", "engine"),
            row("altima", "2024-01-05", "negative", "brakes"),
        ])
    }

    fn app(redact: bool) -> Router {
        let auth = Arc::new(AuthService::new(
            Arc::new(MemoryUserStore::new()),
            MIN_COST,
            redact,
        ));
        build_router(Arc::new(dataset()), auth, &[ORIGIN.to_string()]).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    // ============================================================
    // FEEDBACK ROUTES
    // ============================================================

    #[tokio::test]
    async fn test_data_returns_whole_dataset() {
        let app = app(false);

        let (status, body) = get_json(&app, "/data").await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["model"], "Rogue");
    }

    #[tokio::test]
    async fn test_feedback_by_model_case_insensitive() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/ALTIMA").await;

        assert_eq!(status, StatusCode::OK);
        let models: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["model"].as_str().unwrap())
            .collect();
        assert_eq!(models, vec!["Altima", "altima"]);
    }

    #[tokio::test]
    async fn test_feedback_by_model_unknown_is_empty_array() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/Leaf").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_feedback_details() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/details/altima/1/2024-01-05").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "altima");
        assert_eq!(body["fact"], "negative");
    }

    #[tokio::test]
    async fn test_feedback_details_not_found() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/details/altima/0/2030-01-01").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Feedback not found"}));

        let (status, body) = get_json(&app, "/feedback/details/altima/2/2024-01-05").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Feedback index not found"}));

        let (status, body) = get_json(&app, "/feedback/details/altima/first/2024-01-05").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Feedback index not found"}));
    }

    #[tokio::test]
    async fn test_feedback_details_unparsable_index_without_matches() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/details/altima/x/2030-01-01").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Feedback not found"}));
    }

    #[tokio::test]
    async fn test_feedback_details_index_with_trailing_text() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/details/altima/1abc/2024-01-05").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "altima");
        assert_eq!(body["fact"], "negative");

        let (status, body) = get_json(&app, "/feedback/details/altima/1.5/2024-01-05").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "altima");

        let (status, body) = get_json(&app, "/feedback/details/altima/-1/2024-01-05").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Feedback index not found"}));
    }

    #[tokio::test]
    async fn test_detailed_summary_both_paths() {
        let app = app(false);

        for path in ["/detailed-summary", "/api/detailed-summary"] {
            let uri = format!("{path}?category=positive&models=Altima,Rogue&date=2024-01-05&brand=Nissan");
            let (status, body) = get_json(&app, &uri).await;

            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body.as_array().unwrap().len(), 1);
            assert_eq!(body[0]["model"], "Altima");
        }
    }

    #[tokio::test]
    async fn test_detailed_summary_missing_parameter_is_bad_request() {
        let app = app(false);

        let (status, body) =
            get_json(&app, "/detailed-summary?category=positive&models=Altima&date=2024-01-05").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing required parameters"}));
    }

    #[tokio::test]
    async fn test_detailed_summary_no_match_is_not_found() {
        let app = app(false);

        let (status, body) = get_json(
            &app,
            "/detailed-summary?category=positive&models=altima&date=2024-01-05&brand=Nissan",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "No data found for the specified criteria"}));
    }

    #[tokio::test]
    async fn test_feedback_by_feature_and_sentiment() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/ALTIMA/brakes/negative").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["model"], "altima");

        let (status, body) = get_json(&app, "/feedback/altima/engine/negative").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Feedback not found"}));
    }

    #[tokio::test]
    async fn test_percent_encoded_path_segments() {
        let app = app(false);

        let (status, body) = get_json(&app, "/feedback/Rogue/engine/negative").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["Feature"], "engine");

        let (status, body) = get_json(&app, "/feedback/%41ltima").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    // ============================================================
    // AUTH ROUTES
    // ============================================================

    #[tokio::test]
    async fn test_signup_then_signin() {
        let app = app(false);

        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"username": "kenji", "email": "kenji@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "User signed up successfully!"}));

        let (status, body) = post_json(
            &app,
            "/signin",
            json!({"email": "kenji@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User signed in successfully!");
        assert_eq!(body["user"]["username"], "kenji");
        assert_eq!(body["user"]["email"], "kenji@example.com");
        assert!(body["user"]["password"]
            .as_str()
            .unwrap()
            .starts_with("$sha256$"));
    }

    #[tokio::test]
    async fn test_signin_failures() {
        let app = app(false);
        post_json(
            &app,
            "/signup",
            json!({"username": "kenji", "email": "kenji@example.com", "password": "pw"}),
        )
        .await;

        let (status, body) = post_json(
            &app,
            "/signin",
            json!({"email": "kenji@example.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Invalid credentials!"}));

        let (status, body) = post_json(
            &app,
            "/signin",
            json!({"email": "ghost@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "User not found!"}));

        let (status, body) = post_json(&app, "/signin", json!({"password": "pw"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Failed to sign in!"}));
    }

    #[tokio::test]
    async fn test_signup_missing_field_is_internal_error() {
        let app = app(false);

        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"username": "kenji", "email": "kenji@example.com"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Failed to sign up user!"}));
    }

    #[tokio::test]
    async fn test_signin_redacted_hash() {
        let app = app(true);
        post_json(
            &app,
            "/signup",
            json!({"username": "kenji", "email": "kenji@example.com", "password": "pw"}),
        )
        .await;

        let (status, body) = post_json(
            &app,
            "/signin",
            json!({"email": "kenji@example.com", "password": "pw"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["user"].get("password").is_none());
    }

    // ============================================================
    // FALLBACKS
    // ============================================================

    #[tokio::test]
    async fn test_malformed_json_is_internal_error() {
        let app = app(false);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = app(false);

        let (status, body) = get_json(&app, "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));
    }

    async fn boom() -> &'static str {
        panic!("exploded")
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(catch_panic_layer());

        let (status, body) = get_json(&app, "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_with_credentials() {
        let app = app(false);
        let request = Request::builder()
            .uri("/data")
            .header(header::ORIGIN, ORIGIN)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            ORIGIN
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let app = app(false);
        let request = Request::builder()
            .uri("/data")
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let auth = Arc::new(AuthService::new(
            Arc::new(MemoryUserStore::new()),
            MIN_COST,
            false,
        ));

        let result = build_router(
            Arc::new(dataset()),
            auth,
            &["bad\norigin".to_string()],
        );

        assert!(result.is_err());
    }
}
