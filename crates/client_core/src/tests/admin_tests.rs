use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use shared::domain::UserId;
use shared::protocol::AdminUserUpdate;

use crate::error::ClientError;
use crate::test_support::{admin_row_json, identity_json, page_json, spawn_server};
use crate::{ConfirmAll, DeclineAll, DialogId, MarketClient};

#[derive(Clone)]
struct AdminBackend {
    me: Value,
    users: Arc<Mutex<Vec<Value>>>,
    list_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl AdminBackend {
    fn new(me: Value, users: Vec<Value>) -> Self {
        Self {
            me,
            users: Arc::new(Mutex::new(users)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

async fn me(State(state): State<AdminBackend>) -> Json<Value> {
    Json(json!({"ok": true, "user": state.me.clone()}))
}

async fn list_users(
    State(state): State<AdminBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let page: u32 = params
        .get("page")
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);
    let items = state.users.lock().unwrap().clone();
    let total = items.len() as i64;
    Json(page_json(items, page, total, page > 1, false))
}

async fn update_user(
    State(state): State<AdminBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut users = state.users.lock().unwrap();
    if let Some(user) = users.iter_mut().find(|user| user["id"] == json!(id)) {
        for key in [
            "name",
            "service_type",
            "experience_years",
            "price",
            "about",
            "is_hidden",
        ] {
            if let Some(value) = body.get(key) {
                user[key] = value.clone();
            }
        }
    }
    Json(json!({"ok": true}))
}

async fn delete_user(State(state): State<AdminBackend>, Path(id): Path<i64>) -> Json<Value> {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    state
        .users
        .lock()
        .unwrap()
        .retain(|user| user["id"] != json!(id));
    Json(json!({"ok": true}))
}

async fn client_for(backend: AdminBackend) -> MarketClient {
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id", put(update_user).delete(delete_user))
        .with_state(backend);
    let base = spawn_server(app).await;
    let client = MarketClient::new(base, Arc::new(ConfirmAll)).unwrap();
    client.session.refresh().await.unwrap();
    client
}

fn sample_update(name: &str) -> AdminUserUpdate {
    AdminUserUpdate {
        name: name.into(),
        service_type: "юрист".into(),
        experience_years: 3,
        price: 2000,
        about: String::new(),
        is_hidden: false,
    }
}

#[tokio::test]
async fn non_admin_is_refused_before_any_request() {
    let backend = AdminBackend::new(identity_json(1, "user", false), vec![]);
    let client = client_for(backend.clone()).await;

    let err = client.admin.list_page(1).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthorizationRequired { .. }));
    assert_eq!(backend.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn list_page_stores_snapshot_and_cursor() {
    let backend = AdminBackend::new(
        identity_json(1, "admin", true),
        vec![
            admin_row_json(5, "ivan", "A"),
            admin_row_json(6, "petr", "P"),
        ],
    );
    let client = client_for(backend).await;

    client.admin.list_page(1).await.unwrap();

    let current = client.admin.current().await.unwrap();
    assert_eq!(current.items.len(), 2);
    assert_eq!(client.admin.cursor().await, 1);
}

#[tokio::test]
async fn open_editor_prefills_from_visible_row() {
    let backend = AdminBackend::new(
        identity_json(1, "admin", true),
        vec![admin_row_json(5, "ivan", "A")],
    );
    let client = client_for(backend).await;
    client.admin.list_page(1).await.unwrap();

    let form = client.admin.open_editor(UserId(5)).await.unwrap().unwrap();
    assert_eq!(form.id, UserId(5));
    assert_eq!(form.name, "A");
    assert_eq!(form.service_type, "юрист");
    assert!(client.dialogs.is_open(DialogId::EditUser));
}

#[tokio::test]
async fn open_editor_outside_current_page_is_a_noop() {
    let backend = AdminBackend::new(
        identity_json(1, "admin", true),
        vec![admin_row_json(5, "ivan", "A")],
    );
    let client = client_for(backend).await;
    client.admin.list_page(1).await.unwrap();

    let form = client.admin.open_editor(UserId(99)).await.unwrap();
    assert!(form.is_none());
    assert!(!client.dialogs.is_open(DialogId::EditUser));
}

#[tokio::test]
async fn save_edit_repaints_the_page_from_a_reload() {
    let backend = AdminBackend::new(
        identity_json(1, "admin", true),
        vec![admin_row_json(5, "ivan", "A")],
    );
    let client = client_for(backend.clone()).await;
    client.admin.list_page(1).await.unwrap();
    client.admin.open_editor(UserId(5)).await.unwrap().unwrap();

    client
        .admin
        .save_edit(UserId(5), &sample_update("B"))
        .await
        .unwrap();

    // One initial list plus the post-mutation reload; the row value comes
    // from the reload, not from a local merge.
    assert_eq!(backend.list_calls.load(Ordering::SeqCst), 2);
    let current = client.admin.current().await.unwrap();
    assert_eq!(current.items[0].id, UserId(5));
    assert_eq!(current.items[0].name.as_deref(), Some("B"));
    assert!(!client.dialogs.is_open(DialogId::EditUser));
}

#[tokio::test]
async fn declined_delete_issues_no_request() {
    let backend = AdminBackend::new(
        identity_json(1, "admin", true),
        vec![admin_row_json(5, "ivan", "A")],
    );
    let client = client_for(backend.clone()).await;
    client.admin.list_page(1).await.unwrap();

    let err = client
        .admin
        .delete_user(UserId(5), &DeclineAll)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(backend.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn deleting_the_last_row_follows_the_server_page_state() {
    let backend = AdminBackend::new(
        identity_json(1, "admin", true),
        vec![admin_row_json(7, "last", "L")],
    );
    let client = client_for(backend.clone()).await;

    client.admin.list_page(3).await.unwrap();
    assert_eq!(client.admin.cursor().await, 3);

    client
        .admin
        .delete_user(UserId(7), &ConfirmAll)
        .await
        .unwrap();

    // The client reloads the same page number and takes whatever the server
    // says; it does not step back to page 2 on its own.
    assert_eq!(backend.delete_calls.load(Ordering::SeqCst), 1);
    let current = client.admin.current().await.unwrap();
    assert_eq!(current.page, 3);
    assert!(current.items.is_empty());
    assert!(!current.has_next);
    assert_eq!(client.admin.cursor().await, 3);
}
