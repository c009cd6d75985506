use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use ecomdesk::api::fake::FakeBackend;
use ecomdesk::api::{CasePublicStatus, CaseRecord, ChatResponse};
use ecomdesk::chat::CaseStatus;
use ecomdesk::storage::{MemorySessionStore, SqliteSessionStore};
use ecomdesk::Synchronizer;

#[allow(dead_code)]
pub fn create_temp_store() -> (SqliteSessionStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("session.db");
    let store = SqliteSessionStore::new_with_path(db_path)
        .expect("failed to create sqlite store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn chat_reply(text: &str, case_id: Option<&str>, status: Option<CaseStatus>) -> ChatResponse {
    ChatResponse {
        session_id: String::new(),
        assistant_message: text.to_string(),
        case_id: case_id.map(str::to_string),
        status,
    }
}

#[allow(dead_code)]
pub fn public_status(
    case_id: &str,
    status: Option<CaseStatus>,
    reply: Option<&str>,
) -> CasePublicStatus {
    CasePublicStatus {
        case_id: case_id.to_string(),
        status,
        final_customer_reply: reply.map(str::to_string),
        next_actions: None,
    }
}

#[allow(dead_code)]
pub fn case_record(case_id: &str, status: CaseStatus) -> CaseRecord {
    serde_json::from_value(serde_json::json!({
        "case_id": case_id,
        "order_id": "ORD-10003",
        "reason": "damaged",
        "status": status.as_str(),
        "created_at": "2026-01-15T10:00:00",
        "photos_required": 0,
        "ai_decision_json": {"decision": "approve", "confidence": 0.9},
        "policy_citations_json": null,
        "photo_urls_json": null,
        "next_actions_json": null
    }))
    .expect("valid case record")
}

/// Synchronizer over a fake backend and an in-memory store, initialized
/// with session `s1`.
#[allow(dead_code)]
pub async fn started_synchronizer() -> (Synchronizer, Arc<FakeBackend>, Arc<MemorySessionStore>) {
    let fake = Arc::new(FakeBackend::new());
    let store = Arc::new(MemorySessionStore::new());
    fake.push_session_id("s1");
    let mut sync = Synchronizer::new(fake.clone(), store.clone());
    sync.initialize().await;
    (sync, fake, store)
}
