// API Integration Tests
//
// Purpose: Drive every endpoint through the router with the bundled sample dataset
// and a scripted chat model standing in for Groq.
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use legally_api::{create_router, AppState, ChatMessage, ChatModel, LlmError, SectionStore};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    /// Chat model returning a fixed outcome and counting calls
    struct ScriptedModel {
        calls: AtomicUsize,
        outcome: fn(&[ChatMessage]) -> Result<String, LlmError>,
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)(messages)
        }
    }

    fn manifest_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
    }

    fn load_store() -> Arc<SectionStore> {
        Arc::new(
            SectionStore::load(manifest_path("data/bns_sections.json"))
                .expect("Bundled dataset should load"),
        )
    }

    // Helper: Create test app around a scripted model
    fn create_test_app_with(
        outcome: fn(&[ChatMessage]) -> Result<String, LlmError>,
    ) -> (axum::Router, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel {
            calls: AtomicUsize::new(0),
            outcome,
        });
        let state = AppState::with_model(
            load_store(),
            model.clone(),
            manifest_path("static/index.html"),
        );
        (create_router(state), model)
    }

    fn create_test_app() -> axum::Router {
        create_test_app_with(|messages| {
            // Echo the context the model was given so tests can inspect it
            Ok(messages[1].content.clone())
        })
        .0
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_ask(app: axum::Router, body: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/ask")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    // =========================================================================
    // Section 1: Health, metadata, index page
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = get(create_test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["api"], "Legally - BNS Legal AI");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["legal_framework"], "Bharatiya Nyaya Sanhita, 2023");
        assert_eq!(body["total_sections"], 15);
    }

    #[tokio::test]
    async fn test_metadata() {
        let response = get(create_test_app(), "/api/metadata").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["title"], "Bharatiya Nyaya Sanhita, 2023");
        assert_eq!(body["total_sections"], 358);
        assert_eq!(body["effective_date"], "July 1, 2024");
        assert_eq!(body["replaces"], "Indian Penal Code, 1860");
        assert!(body["note"].is_string(), "Extra metadata keys should pass through");
    }

    #[tokio::test]
    async fn test_index_page_served() {
        let response = get(create_test_app(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<textarea"));
    }

    #[tokio::test]
    async fn test_index_page_fallback() {
        let state = AppState::with_model(
            load_store(),
            Arc::new(ScriptedModel {
                calls: AtomicUsize::new(0),
                outcome: |_| Ok(String::new()),
            }),
            PathBuf::from("/nonexistent/index.html"),
        );
        let response = get(create_router(state), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("index.html not found"));
    }

    // =========================================================================
    // Section 2: Section browsing
    // =========================================================================

    #[tokio::test]
    async fn test_get_section_by_id() {
        let response = get(create_test_app(), "/api/sections/103").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["section"], "103");
        assert_eq!(body["title"], "Punishment for murder");
        assert_eq!(body["act"], "BNS");
        assert_eq!(body["category"], "Offences affecting the human body");
    }

    #[tokio::test]
    async fn test_section_without_punishment_serializes_null() {
        let body = json_response(get(create_test_app(), "/api/sections/101").await).await;
        assert!(body["punishment"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_section_is_404() {
        let response = get(create_test_app(), "/api/sections/999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_response(response).await;
        assert_eq!(body["detail"], "Section 999 not found");
    }

    #[tokio::test]
    async fn test_list_sections_default_page() {
        let body = json_response(get(create_test_app(), "/api/sections").await).await;
        assert_eq!(body["total"], 15);
        assert_eq!(body["sections"].as_array().unwrap().len(), 15);
        // Dataset file order
        assert_eq!(body["sections"][0]["section"], "85");
    }

    #[tokio::test]
    async fn test_list_sections_search_theft() {
        let body = json_response(get(create_test_app(), "/api/sections?search=Theft").await).await;
        let sections = body["sections"].as_array().unwrap();

        assert_eq!(body["total"], 3);
        for section in sections {
            let text = format!(
                "{} {} {}",
                section["title"].as_str().unwrap(),
                section["description"].as_str().unwrap(),
                section["section"].as_str().unwrap()
            )
            .to_lowercase();
            assert!(text.contains("theft"), "{} should mention theft", section["section"]);
        }
    }

    #[tokio::test]
    async fn test_list_sections_pagination() {
        let body = json_response(
            get(create_test_app(), "/api/sections?search=theft&limit=2&offset=1").await,
        )
        .await;
        let ids: Vec<&str> = body["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["section"].as_str().unwrap())
            .collect();

        assert_eq!(body["total"], 3);
        assert_eq!(ids, vec!["305", "309"]);
    }

    #[tokio::test]
    async fn test_list_sections_by_category() {
        let body = json_response(
            get(create_test_app(), "/api/sections?category=offences%20against%20property").await,
        )
        .await;
        assert_eq!(body["total"], 6);
        for section in body["sections"].as_array().unwrap() {
            assert_eq!(section["category"], "Offences against property");
        }
    }

    #[tokio::test]
    async fn test_list_sections_rejects_bad_limit() {
        let response = get(create_test_app(), "/api/sections?limit=-1").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_categories_sorted_with_total() {
        let body = json_response(get(create_test_app(), "/api/categories").await).await;
        let categories: Vec<&str> = body["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_str().unwrap())
            .collect();

        assert_eq!(
            categories,
            vec![
                "Criminal intimidation, insult, annoyance and defamation",
                "Offences affecting the human body",
                "Offences against property",
                "Offences against woman and child",
            ]
        );
        assert_eq!(body["total"], categories.len());
    }

    // =========================================================================
    // Section 3: Question answering
    // =========================================================================

    #[tokio::test]
    async fn test_ask_returns_model_reply() {
        let response = post_ask(create_test_app(), r#"{"message": "What is the punishment for murder?"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        let reply = body["reply"].as_str().unwrap();
        // The echo model returns the user prompt: ranked context + question
        assert!(reply.contains("### RELEVANT BNS SECTIONS:"));
        assert!(reply.contains("**Section 103: Punishment for murder**"));
        assert!(reply.contains("USER QUESTION:\nWhat is the punishment for murder?"));
    }

    #[tokio::test]
    async fn test_ask_context_limited_to_five_sections() {
        let response = post_ask(create_test_app(), r#"{"message": "whoever property person"}"#).await;
        let body = json_response(response).await;
        let reply = body["reply"].as_str().unwrap();
        assert_eq!(reply.matches("**Section ").count(), 5);
    }

    #[tokio::test]
    async fn test_ask_short_message_is_400_without_model_call() {
        let (app, model) = create_test_app_with(|_| Ok("unused".to_string()));
        let response = post_ask(app, r#"{"message": "  a "}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_response(response).await;
        assert_eq!(body["detail"], "Please provide a valid question");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ask_missing_message_is_400() {
        let response = post_ask(create_test_app(), r#"{}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_malformed_body_is_400() {
        let response = post_ask(create_test_app(), "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_upstream_timeout_is_504() {
        let (app, _) = create_test_app_with(|_| Err(LlmError::Timeout));
        let response = post_ask(app, r#"{"message": "theft of a bicycle"}"#).await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let body = json_response(response).await;
        assert_eq!(body["detail"], "AI service timeout");
    }

    #[tokio::test]
    async fn test_ask_upstream_status_is_propagated() {
        let (app, _) = create_test_app_with(|_| {
            Err(LlmError::Status {
                status: 429,
                body: "rate limit exceeded".to_string(),
            })
        });
        let response = post_ask(app, r#"{"message": "theft of a bicycle"}"#).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = json_response(response).await;
        assert!(body["detail"].as_str().unwrap().contains("rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_ask_malformed_upstream_is_500() {
        let (app, _) = create_test_app_with(|_| {
            Err(LlmError::MalformedResponse("missing choices".to_string()))
        });
        let response = post_ask(app, r#"{"message": "theft of a bicycle"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_ask_without_api_key_is_500() {
        let (app, _) = create_test_app_with(|_| Err(LlmError::MissingApiKey));
        let response = post_ask(app, r#"{"message": "theft of a bicycle"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_response(response).await;
        assert_eq!(body["detail"], "Groq API key not configured");
    }

    #[tokio::test]
    async fn test_ask_panicking_model_is_json_500() {
        let (app, model) = create_test_app_with(|_| panic!("model exploded"));
        let response = post_ask(app, r#"{"message": "theft of a bicycle"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);

        let body = json_response(response).await;
        assert_eq!(body["detail"], "Internal server error: unexpected failure");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://app.flutterflow.io")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
