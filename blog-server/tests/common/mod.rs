#![allow(dead_code)]

use std::sync::Arc;

use blog_server::domain::session::SessionUser;
use blog_server::infrastructure::config::AppConfig;
use blog_server::infrastructure::memory::InMemoryBackend;
use blog_server::server::{AppState, Backend};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::{Value, json};

pub const ADMIN_SECRET: &str = "admin-secret";
pub const MEMBER_SECRET: &str = "member-secret";

pub fn at(minutes: i64) -> String {
    let base: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (base + Duration::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn post_doc(id: &str, title: &str, minutes: i64) -> Value {
    json!({
        "$id": id,
        "$createdAt": at(minutes),
        "title": title,
        "slug": blog_server::domain::slug::slugify(title),
        "content": format!("<p>{title}</p>"),
        "category": [],
        "status": "published",
    })
}

pub fn with(mut doc: Value, field: &str, value: Value) -> Value {
    doc[field] = value;
    doc
}

pub async fn setup() -> (Arc<InMemoryBackend>, AppState) {
    let store = Arc::new(InMemoryBackend::new());
    store
        .add_session(
            ADMIN_SECRET,
            SessionUser {
                id: "admin".into(),
                email: "admin@example.com".into(),
                email_verified: true,
            },
            vec!["writers".into(), "admins".into()],
        )
        .await;
    store
        .add_session(
            MEMBER_SECRET,
            SessionUser {
                id: "reader".into(),
                email: "reader@example.com".into(),
                email_verified: true,
            },
            vec!["readers".into()],
        )
        .await;

    let state = AppState::new(Backend::in_memory(store.clone()), &AppConfig::in_memory());
    (store, state)
}

pub async fn seed(store: &InMemoryBackend, docs: impl IntoIterator<Item = Value>) {
    for doc in docs {
        store.insert_document("posts", doc).await;
    }
}

pub async fn seed_category(store: &InMemoryBackend, id: &str, name: &str) {
    store
        .insert_document("categories", json!({ "$id": id, "name": name }))
        .await;
}
