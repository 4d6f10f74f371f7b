mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};

use essay_api::feedback::parser::fallback_feedback;
use essay_api::llm_client::LlmError;
use helpers::{analyze_body, post_json, post_json_as, review_reply, ScriptedModel, TestApp};

const TOPIC: &str = "Some people think museums should entertain rather than educate.";
const ESSAY: &str = "Museums have long been places of learning. However, many now compete with cinemas.";

fn fallback_json() -> Value {
    serde_json::to_value(fallback_feedback()).unwrap()
}

async fn essay_rows(app: &TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM essays")
        .fetch_one(&app.state.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_analyze_returns_model_scores() {
    let app = TestApp::new(ScriptedModel::replying(&[&review_reply(6.54, 6.5)])).await;

    let (status, body) = app.send(post_json("/api/analyze", analyze_body(TOPIC, ESSAY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_score"], json!(6.5));
    for (_, score) in body["rubric_scores"].as_object().unwrap() {
        let score = score.as_f64().unwrap();
        assert!((0.0..=9.0).contains(&score));
    }
    // Missing section score is filled from the rubric.
    assert_eq!(body["coherence_cohesion"]["score"], json!(6.5));
    assert_eq!(app.llm.calls(), 1);
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let fenced = format!("```json\n{}\n```", review_reply(7.0, 7.0));
    let app = TestApp::new(ScriptedModel::replying(&[&fenced])).await;

    let (status, body) = app.send(post_json("/api/analyze", analyze_body(TOPIC, ESSAY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_score"], json!(7.0));
    assert_ne!(body, fallback_json());
}

#[tokio::test]
async fn test_upstream_failure_serves_fallback() {
    let model = ScriptedModel::new();
    model.push_error(LlmError::Api {
        status: 500,
        message: "InternalError".to_string(),
    });
    let app = TestApp::new(model).await;

    let (status, body) = app.send(post_json("/api/analyze", analyze_body(TOPIC, ESSAY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, fallback_json());
    assert_eq!(app.llm.calls(), 1);
}

#[tokio::test]
async fn test_unparsable_reply_serves_fallback() {
    let app = TestApp::new(ScriptedModel::replying(&["I'm sorry, I can't grade this essay."])).await;

    let (status, body) = app.send(post_json("/api/analyze", analyze_body(TOPIC, ESSAY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, fallback_json());
}

#[tokio::test]
async fn test_out_of_range_score_serves_fallback() {
    let app = TestApp::new(ScriptedModel::replying(&[&review_reply(11.0, 6.0)])).await;

    let (status, body) = app.send(post_json("/api/analyze", analyze_body(TOPIC, ESSAY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, fallback_json());
}

#[tokio::test]
async fn test_empty_inputs_are_rejected_without_upstream_call() {
    let app = TestApp::new(ScriptedModel::new()).await;

    for body in [
        analyze_body("", ESSAY),
        analyze_body(TOPIC, ""),
        analyze_body("   ", ESSAY),
        analyze_body(TOPIC, "\n\t"),
        json!({"essay": ESSAY}),
    ] {
        let (status, response) = app.send(post_json("/api/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    }

    assert_eq!(app.llm.calls(), 0);
}

#[tokio::test]
async fn test_anonymous_analysis_is_not_saved() {
    let app = TestApp::new(ScriptedModel::replying(&[&review_reply(6.0, 6.0)])).await;

    let (status, _) = app.send(post_json("/api/analyze", analyze_body(TOPIC, ESSAY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(essay_rows(&app).await, 0);
}

#[tokio::test]
async fn test_signed_in_analysis_is_saved_even_on_fallback() {
    let app = TestApp::new(ScriptedModel::new()).await;
    let session = app.sign_up("mei").await;

    let (status, body) = app
        .send(post_json_as("/api/analyze", analyze_body(TOPIC, ESSAY), &session))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, fallback_json());
    assert_eq!(essay_rows(&app).await, 1);
}

#[tokio::test]
async fn test_chat_answers_question() {
    let app = TestApp::new(ScriptedModel::replying(&["Use more varied linking words."])).await;

    let (status, body) = app
        .send(post_json(
            "/api/chat",
            json!({"question": "How can I improve coherence?", "context": {"overall_score": 6.0}}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Use more varied linking words.");
    assert_eq!(app.llm.calls(), 1);
}

#[tokio::test]
async fn test_chat_requires_question() {
    let app = TestApp::new(ScriptedModel::new()).await;

    let (status, _) = app
        .send(post_json("/api/chat", json!({"question": "", "context": "{}"})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.llm.calls(), 0);
}

#[tokio::test]
async fn test_chat_upstream_failure_is_an_error() {
    let app = TestApp::new(ScriptedModel::new()).await;

    let (status, body) = app
        .send(post_json("/api/chat", json!({"question": "Why 6.0?"})))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "LLM_ERROR");
}

#[tokio::test]
async fn test_null_fields_are_treated_as_empty() {
    let app = TestApp::new(ScriptedModel::new()).await;

    for body in [
        json!({"topic": null, "essay": ESSAY}),
        json!({"topic": TOPIC, "essay": null}),
    ] {
        let (status, response) = app.send(post_json("/api/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    }

    let (status, _) = app
        .send(post_json("/api/chat", json!({"question": null})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.llm.calls(), 0);
}

#[tokio::test]
async fn test_non_json_body_is_a_validation_error() {
    let app = TestApp::new(ScriptedModel::new()).await;

    let plain = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("topic=a&essay=b"))
        .unwrap();
    let (status, body) = app.send(plain).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .send(post_json("/api/analyze", json!({"topic": 42, "essay": ESSAY})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    assert_eq!(app.llm.calls(), 0);
}

#[tokio::test]
async fn test_failed_save_still_returns_feedback() {
    let app = TestApp::new(ScriptedModel::replying(&[&review_reply(7.0, 7.0)])).await;
    let session = app.sign_up("mei").await;
    sqlx::query("DROP TABLE essays")
        .execute(&app.state.db)
        .await
        .unwrap();

    let (status, body) = app
        .send(post_json_as("/api/analyze", analyze_body(TOPIC, ESSAY), &session))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_score"], json!(7.0));
    assert_ne!(body, fallback_json());
    assert_eq!(app.llm.calls(), 1);
}
