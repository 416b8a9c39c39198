#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::MockServer;

use stationery_client::auth::StoredSession;
use stationery_client::{ClientConfig, SessionClient, SessionStore};

pub const ACCESS_TOKEN: &str = "access-token";
pub const REFRESH_TOKEN: &str = "refresh-token";

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_url: format!("{}/api", server.uri()),
        ..ClientConfig::default()
    }
}

pub fn seeded_store() -> SessionStore {
    let store = SessionStore::in_memory();
    store
        .save(&StoredSession::new(
            ACCESS_TOKEN.to_string(),
            REFRESH_TOKEN.to_string(),
            Some(json!({"role": "stock_manager", "email": "manager@school.test"})),
        ))
        .expect("seeding the in-memory store cannot fail");
    store
}

pub fn session_client(server: &MockServer) -> SessionClient {
    SessionClient::new(config_for(server), seeded_store())
}

pub fn inventory_item(id: u64, name: &str, category: &str, quantity: u32, threshold: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": {"id": id * 10, "name": category, "is_custom": false},
        "quantity": quantity,
        "low_stock_threshold": threshold,
        "status": "in_stock"
    })
}

pub fn pending_request(id: u64, item_id: u64, item_name: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "user": {"id": 1, "email": "teacher@school.test", "first_name": "Dana", "last_name": "Cole", "role": "teacher"},
        "item": {"id": item_id, "name": item_name, "quantity": 40},
        "quantity": quantity,
        "status": "pending",
        "notes": "for the art lesson",
        "created_at": "2025-03-01T09:30:00Z",
        "teacher_profile": {
            "id": 7,
            "bio": "",
            "class_subjects": [
                {"id": 1, "class_taught": {"id": 3, "name": "5B", "grade_level": "5"}, "subject": {"id": 2, "name": "Art"}}
            ]
        }
    })
}

pub fn notification(id: u64, notification_type: &str, is_read: bool) -> Value {
    json!({
        "id": id,
        "notification_type": notification_type,
        "message": format!("notification {id}"),
        "is_read": is_read,
        "timestamp": "2025-03-02T08:00:00Z"
    })
}
