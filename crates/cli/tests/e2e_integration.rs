//! End-to-end tests for the IronLog runtime.
//!
//! These run the full stack a Discord interaction travels through:
//! signed POST → gateway → controller → SQLite store → OpenAI-compatible
//! provider → followup webhook. OpenAI and Discord are replaced by local
//! axum servers that record what they receive.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use ed25519_dalek::{Signer, SigningKey};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use ironlog_channels::commands::{DIARY_MODAL_ID, DIARY_TEXT_ID};
use ironlog_channels::interaction::kind;
use ironlog_channels::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use ironlog_channels::{DiscordRest, SignatureVerifier};
use ironlog_coach::{ChannelScope, Controller, Generator};
use ironlog_core::clock::SystemClock;
use ironlog_core::store::{DiaryStore, LogQuery, LogStore};
use ironlog_gateway::{GatewayState, build_router};
use ironlog_providers::OpenAiCompatProvider;
use ironlog_store::SqliteStore;

const WORKOUT: &str = "1001";
const DIARY: &str = "1002";
const USER: &str = "42";

const FEEDBACK: &str = "Here you go:\n```json\n{\"grammar\": \"goed → went\", \"rephrase\": \"I went to the gym.\", \"useful_phrases\": \"hit the gym\", \"advice\": \"過去形に注意\"}\n```";

// ── Fake upstreams ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Recorded {
    completions: Arc<Mutex<Vec<Value>>>,
    followups: Arc<Mutex<Vec<(String, String)>>>,
}

impl Recorded {
    async fn wait_for_followups(&self, n: usize) -> Vec<(String, String)> {
        for _ in 0..200 {
            if self.followups.lock().unwrap().len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.followups.lock().unwrap().clone()
    }
}

/// Answers like the trainer or the coach depending on the system prompt.
async fn chat_completions(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.completions.lock().unwrap().push(body.clone());
    let system = body["messages"][0]["content"].as_str().unwrap_or_default();
    let content = if system.contains("英語") {
        FEEDBACK
    } else {
        "ブルガリアンスクワット 3x10"
    };
    Json(json!({
        "model": "gpt-4o",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15},
    }))
}

async fn webhook(
    State(rec): State<Recorded>,
    Path((_app, token)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let content = body["content"].as_str().unwrap_or_default().to_string();
    rec.followups.lock().unwrap().push((token, content));
    Json(json!({"id": "msg"}))
}

async fn spawn_upstreams(rec: Recorded) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/api/webhooks/{app}/{token}", post(webhook))
        .with_state(rec);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// ── Harness ──────────────────────────────────────────────────────────────

struct Stack {
    app: Router,
    key: SigningKey,
    store: Arc<SqliteStore>,
    recorded: Recorded,
}

async fn stack() -> Stack {
    let recorded = Recorded::default();
    let upstream = spawn_upstreams(recorded.clone()).await;

    let store = Arc::new(SqliteStore::new(":memory:").await.unwrap());
    let provider = Arc::new(
        OpenAiCompatProvider::new("openai", format!("{upstream}/v1"), "sk-test").unwrap(),
    );
    let controller = Arc::new(Controller::new(
        store.clone(),
        store.clone(),
        Generator::new(provider, "gpt-4o"),
        ChannelScope::new(WORKOUT, DIARY),
        Arc::new(SystemClock),
    ));

    let key = SigningKey::from_bytes(&[11u8; 32]);
    let rest = Arc::new(DiscordRest::new(format!("{upstream}/api"), "app", None).unwrap());
    let state = GatewayState::new(
        controller,
        SignatureVerifier::from_key(key.verifying_key()),
        rest,
    );

    Stack {
        app: build_router(Arc::new(state)),
        key,
        store,
        recorded,
    }
}

impl Stack {
    async fn send(&self, body: Value) -> Value {
        let body = body.to_string();
        let timestamp = "1700000000";
        let signature = self.key.sign(format!("{timestamp}{body}").as_bytes());
        let req = Request::builder()
            .method("POST")
            .uri("/interactions")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, hex::encode(signature.to_bytes()))
            .header(TIMESTAMP_HEADER, timestamp)
            .body(Body::from(body))
            .unwrap();

        let response = self.app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}

fn slash(token: &str, channel: &str, name: &str, options: Value) -> Value {
    json!({
        "id": format!("i-{token}"),
        "type": kind::APPLICATION_COMMAND,
        "application_id": "app",
        "token": token,
        "channel_id": channel,
        "member": {"user": {"id": USER, "username": "lifter"}},
        "data": {"name": name, "options": options},
    })
}

fn log(token: &str, category: &str, exercise: &str, weight: i64, reps: i64) -> Value {
    slash(
        token,
        WORKOUT,
        "workout_log",
        json!([
            {"name": "category", "value": category},
            {"name": "exercise", "value": exercise},
            {"name": "weight", "value": weight},
            {"name": "reps", "value": reps},
        ]),
    )
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn log_then_history_round_trip() {
    let s = stack().await;

    let first = s.send(log("t1", "Chest", "ベンチプレス", 60, 10)).await;
    assert_eq!(first["type"], 4);
    assert_eq!(first["data"]["content"], "胸 - ベンチプレス 60kg x 10回 記録しました！");

    s.send(log("t2", "Legs", "スクワット", 80, 5)).await;

    let history = s.send(slash("t3", WORKOUT, "workout_history", json!([]))).await;
    let content = history["data"]["content"].as_str().unwrap();
    assert!(content.starts_with("最近の記録:\n"));
    let lines: Vec<_> = content.lines().skip(1).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("Legs - スクワット 80kg x 5回"));
    assert!(lines[1].ends_with("Chest - ベンチプレス 60kg x 10回"));

    let stored = s.store.query(LogQuery::recent(USER, 10)).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn invalid_category_is_rejected_without_writing() {
    let s = stack().await;

    let response = s.send(log("t1", "Neck", "シュラッグ", 20, 10)).await;

    assert_eq!(response["type"], 4);
    assert_eq!(response["data"]["flags"], 64);
    assert!(s.store.query(LogQuery::recent(USER, 10)).await.unwrap().is_empty());
}

#[tokio::test]
async fn recommend_defers_and_follows_up_with_generated_menu() {
    let s = stack().await;
    s.send(log("t1", "Chest", "ベンチプレス", 60, 10)).await;

    let response = s.send(slash("t2", WORKOUT, "workout_recommend", json!([]))).await;
    assert_eq!(response, json!({"type": 5}));

    let followups = s.recorded.wait_for_followups(1).await;
    assert_eq!(followups.len(), 1);
    assert_eq!(followups[0].0, "t2");
    assert_eq!(followups[0].1, "💡 今日のおすすめメニュー:\nブルガリアンスクワット 3x10");

    let completions = s.recorded.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0]["model"], "gpt-4o");
    let prompt = completions[0]["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("Chest - ベンチプレス 60kg x 10回"));
    assert!(prompt.contains("最も長くトレーニングしていない部位は Chest です。"));
}

#[tokio::test]
async fn recommend_without_history_skips_generator() {
    let s = stack().await;

    let response = s.send(slash("t1", WORKOUT, "workout_recommend", json!([]))).await;
    assert_eq!(response, json!({"type": 5}));

    let followups = s.recorded.wait_for_followups(1).await;
    assert_eq!(followups[0].1, "まだ記録がないので、まずは記録してください！");
    assert!(s.recorded.completions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn diary_modal_flow_persists_feedback() {
    let s = stack().await;

    let opened = s.send(slash("t1", DIARY, "diary", json!([]))).await;
    assert_eq!(opened["type"], 9);
    assert_eq!(opened["data"]["custom_id"], DIARY_MODAL_ID);

    let submitted = s
        .send(json!({
            "id": "i-t2",
            "type": kind::MODAL_SUBMIT,
            "application_id": "app",
            "token": "t2",
            "channel_id": DIARY,
            "member": {"user": {"id": USER}},
            "data": {
                "custom_id": DIARY_MODAL_ID,
                "components": [{"type": 1, "components": [
                    {"type": 4, "custom_id": DIARY_TEXT_ID, "value": "I goed to the gym."}
                ]}],
            },
        }))
        .await;
    assert_eq!(submitted, json!({"type": 5}));

    let followups = s.recorded.wait_for_followups(1).await;
    let feedback = &followups[0].1;
    assert!(feedback.starts_with("📝 フィードバック:\n"));
    assert!(feedback.contains("【文法や表現の誤り】\ngoed → went"));
    assert!(feedback.contains("【アドバイス】\n過去形に注意"));

    let diaries = s.store.query_diary(LogQuery::recent(USER, 5)).await.unwrap();
    assert_eq!(diaries.len(), 1);
    assert_eq!(diaries[0].diary_text, "I goed to the gym.");
    assert_eq!(diaries[0].feedback.advice, "過去形に注意");
}

#[tokio::test]
async fn command_in_wrong_channel_touches_nothing() {
    let s = stack().await;

    let response = s
        .send(slash("t1", WORKOUT, "diary", json!([{"name": DIARY_TEXT_ID, "value": "Hello."}])))
        .await;

    assert_eq!(response["type"], 4);
    assert_eq!(response["data"]["flags"], 64);
    assert_eq!(
        response["data"]["content"],
        "このコマンドは指定の日記チャンネルでのみ利用できます。"
    );
    assert!(s.recorded.completions.lock().unwrap().is_empty());
    assert!(s.recorded.followups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn diary_form_only_opens_in_diary_channel() {
    let s = stack().await;

    let response = s.send(slash("t1", WORKOUT, "diary", json!([]))).await;

    assert_eq!(response["type"], 4);
    assert_eq!(response["data"]["flags"], 64);
    assert_eq!(
        response["data"]["content"],
        "このコマンドは指定の日記チャンネルでのみ利用できます。"
    );
}
