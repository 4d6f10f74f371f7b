#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use essay_api::config::Config;
use essay_api::db::create_memory_pool;
use essay_api::llm_client::{GenerationParams, LanguageModel, LlmError};
use essay_api::ocr::TextRecognizer;
use essay_api::reference::ReferenceData;
use essay_api::routes::build_router;
use essay_api::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// Language model that plays back queued replies and counts calls.
/// Once the queue is empty every call fails.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        let model = Self::new();
        for reply in replies {
            model.push_reply(reply);
        }
        model
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
    }

    pub fn push_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &str, _params: GenerationParams) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Recognizer returning canned text, or failing when `text` is `None`.
pub struct StubRecognizer {
    pub text: Option<String>,
    pub seen: Mutex<Vec<Vec<u8>>>,
}

impl StubRecognizer {
    pub fn reading(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextRecognizer for StubRecognizer {
    async fn recognize(&self, image: &[u8]) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push(image.to_vec());
        self.text.clone().ok_or_else(|| anyhow!("engine crashed"))
    }
}

pub fn test_config(reference_dir: &Path) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        dashscope_api_key: "test-key".to_string(),
        dashscope_base_url: "http://127.0.0.1:9".to_string(),
        dashscope_model: "scripted".to_string(),
        llm_timeout_secs: 5,
        secret_key: TEST_SECRET.to_string(),
        session_ttl_hours: 1,
        reference_data_dir: reference_dir.to_path_buf(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// The data files shipped with the crate.
pub fn bundled_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub llm: Arc<ScriptedModel>,
}

impl TestApp {
    pub async fn new(llm: Arc<ScriptedModel>) -> Self {
        Self::build(llm, None, &bundled_data_dir()).await
    }

    pub async fn build(
        llm: Arc<ScriptedModel>,
        ocr: Option<Arc<dyn TextRecognizer>>,
        reference_dir: &Path,
    ) -> Self {
        let db = create_memory_pool().await.expect("Failed to create test pool");
        let state = AppState {
            db,
            llm: llm.clone(),
            ocr,
            reference: ReferenceData::new(reference_dir),
            config: test_config(reference_dir),
        };

        Self {
            router: build_router(state.clone()),
            state,
            llm,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send_raw(request).await;
        (status, body)
    }

    /// Returns the status, every Set-Cookie header, and the JSON body (Null if empty).
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<String>, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, cookies, json)
    }

    /// Registers and logs in, returning the `session=...` cookie pair.
    pub async fn sign_up(&self, username: &str) -> String {
        let (status, body) = self
            .send(post_json(
                "/register",
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "hunter22",
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");

        let (status, cookies, body) = self
            .send_raw(post_json(
                "/login",
                json!({"username": username, "password": "hunter22"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        session_pair(&cookies).expect("login did not set a session cookie")
    }
}

pub fn session_pair(cookies: &[String]) -> Option<String> {
    cookies
        .iter()
        .find(|c| c.starts_with("session="))
        .and_then(|c| c.split(';').next())
        .map(str::to_string)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_as(uri: &str, body: Value, session: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, session)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_as(uri: &str, session: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap()
}

/// A well-formed review reply with the given overall and uniform sub-scores.
pub fn review_reply(overall: f64, sub: f64) -> String {
    json!({
        "overall_score": overall,
        "overall_feedback": "Clear position with adequate support.",
        "rubric_scores": {
            "task_achievement": sub,
            "coherence_cohesion": sub,
            "lexical_resource": sub,
            "grammatical_range_accuracy": sub
        },
        "statistics": {
            "linking_words_count": 6,
            "linking_words_goal": 7,
            "word_repetition_count": 2,
            "word_repetition_goal": 3,
            "grammar_mistakes_count": 1,
            "grammar_mistakes_goal": 0
        },
        "task_achievement": {
            "score": sub,
            "strengths": ["Answers the question"],
            "areas_for_improvement": ["Develop the second body paragraph"],
            "improvement_suggestions": {"how_to_address_prompt": "Restate both views."}
        },
        "coherence_cohesion": {
            "strengths": ["Logical paragraphing"],
            "areas_for_improvement": []
        },
        "lexical_resource": {
            "score": sub,
            "vocabulary_improvements": [{
                "incorrect": "very big",
                "correct": "substantial",
                "explanation": "More precise",
                "error_type": "word_choice"
            }]
        },
        "grammatical_range_accuracy": {
            "score": sub,
            "grammar_corrections": [{
                "incorrect": "people is",
                "correct": "people are",
                "explanation": "Subject-verb agreement",
                "error_type": "agreement",
                "sentence_context": "Many people is moving to cities."
            }]
        }
    })
    .to_string()
}

pub fn analyze_body(topic: &str, essay: &str) -> Value {
    json!({"topic": topic, "essay": essay})
}
