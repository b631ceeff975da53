//! HttpAugmentClient 对接本地模拟的增强服务

#![cfg(feature = "server")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aide::augment::{
    AugmentError, AugmentationClient, Capabilities, CompletionPredictor, EntityAnalyzer,
    HttpAugmentClient, LivenessProbe, SentimentAnalyzer, TaskSuggester,
};
use aide::nlp::{Intent, IntentClassifier, Origin, PatternClassifier};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

async fn spawn_service(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn fake_service() -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/api/extract-entities",
            post(|Json(body): Json<Value>| async move {
                assert!(body["text"].is_string());
                Json(json!({
                    "entities": [
                        {"text": "tomorrow", "label": "DATE", "start_char": 22, "end_char": 30},
                        {"text": "Acme", "label": "ORG"}
                    ]
                }))
            }),
        )
        .route(
            "/api/sentiment-analysis",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        )
        .route(
            "/api/predict-completion",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "completion": "too late" }))
            }),
        )
        .route(
            "/api/suggest-tasks",
            post(|Json(body): Json<Value>| async move {
                let user = body["user_id"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "suggestions": [
                        {"text": format!("Plan the week for {user}"), "category": "Planning", "reason": null}
                    ]
                }))
            }),
        )
}

#[tokio::test]
async fn test_http_capabilities_against_local_service() {
    let addr = spawn_service(fake_service()).await;
    let client = HttpAugmentClient::new(&format!("http://{addr}/"), Duration::from_millis(500)).unwrap();

    assert!(client.is_available().await);

    let entities = client.extract_entities("remind me to call mom tomorrow").await.unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].kind, "date");
    assert_eq!(entities[0].source_span.map(|s| (s.start, s.end)), Some((22, 30)));
    assert_eq!(entities[1].kind, "organization");
    assert!(entities.iter().all(|e| e.origin == Origin::Remote));

    let err = client.analyze_sentiment("great day").await.unwrap_err();
    assert_eq!(err, AugmentError::Status(500));

    let err = client.predict_completion("call").await.unwrap_err();
    assert_eq!(err, AugmentError::Timeout);

    let suggestions = client.suggest_tasks("u1", &json!({})).await.unwrap();
    assert_eq!(suggestions[0].text, "Plan the week for u1");
    assert_eq!(suggestions[0].category.as_deref(), Some("Planning"));
}

#[tokio::test]
async fn test_failed_capability_falls_back_inside_enrichment() {
    let addr = spawn_service(fake_service()).await;
    let http = Arc::new(HttpAugmentClient::new(&format!("http://{addr}"), Duration::from_millis(500)).unwrap());
    let augment = AugmentationClient::new(Capabilities::uniform(http), Duration::from_millis(500));

    let classification = PatternClassifier::shared().classify("analyze my mood").unwrap();
    assert_eq!(classification.intent, Intent::SentimentAnalyze);

    let outcome = augment.enrich("u1", &classification).await.unwrap();
    assert!(!outcome.available);
    assert_eq!(outcome.entities.len(), 2);
    let sentiment = outcome.sentiment.unwrap();
    assert_eq!(sentiment.label, "NEUTRAL");
    assert_eq!(sentiment.score, 0.5);
    assert!(outcome.completion.is_none());
}

#[tokio::test]
async fn test_unreachable_service_skips_enrichment() {
    // 绑定后立即释放，得到一个无人监听的端口
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let http = Arc::new(HttpAugmentClient::new(&format!("http://127.0.0.1:{port}"), Duration::from_millis(300)).unwrap());
    assert!(!http.is_available().await);

    let augment = AugmentationClient::new(Capabilities::uniform(http), Duration::from_millis(300));
    let classification = PatternClassifier::shared().classify("remind me to call mom").unwrap();
    assert!(augment.enrich("u1", &classification).await.is_none());
    assert_eq!(augment.probed(), Some(false));
}
