use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::ClientEvent;

pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

pub fn identity_json(id: i64, login: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "login": login,
        "name": "Иван Иванов",
        "service_type": "репетитор",
        "experience_years": 5,
        "price": 1500,
        "about": null,
        "is_hidden": false,
        "is_admin": is_admin,
    })
}

pub fn admin_row_json(id: i64, login: &str, name: &str) -> Value {
    json!({
        "id": id,
        "login": login,
        "name": name,
        "service_type": "юрист",
        "experience_years": 3,
        "price": 2000,
        "about": "",
        "is_hidden": false,
        "is_admin": false,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-02T00:00:00Z",
    })
}

pub fn page_json(items: Vec<Value>, page: u32, total: i64, has_prev: bool, has_next: bool) -> Value {
    json!({
        "ok": true,
        "items": items,
        "page": page,
        "per_page": 5,
        "total": total,
        "has_prev": has_prev,
        "has_next": has_next,
    })
}

pub fn drain_events(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
