#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const GOOD_PASSWORD: &str = "letmein";
pub const UPLOADED_URL: &str = "https://cdn.test/demo/image/upload/v1/photo.png";

#[derive(Default)]
struct Store {
    collections: HashMap<String, Vec<Value>>,
    requests: Vec<String>,
    next_id: u64,
    fail_with: Option<u16>,
    uploads: Vec<Vec<u8>>,
}

type Shared = Arc<Mutex<Store>>;

type Reply = (StatusCode, Json<Value>);

/// In-process stand-in for the REST backend, the admin-auth host and the
/// image host, all on one ephemeral port.
pub struct FakeBackend {
    pub base_url: String,
    store: Shared,
}

impl FakeBackend {
    pub async fn start() -> Result<Self> {
        let store: Shared = Arc::new(Mutex::new(Store::default()));

        let app = Router::new()
            .route("/api/admin/login", post(login))
            .route("/v1_1/:cloud/image/upload", post(upload))
            .route("/api/:slug", get(list).post(create))
            .route("/api/:slug/:id", put(update).delete(remove))
            .with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            store,
        })
    }

    pub fn seed(&self, slug: &str, records: Vec<Value>) {
        let mut store = self.store.lock().unwrap();
        store.collections.insert(slug.to_string(), records);
    }

    pub fn records(&self, slug: &str) -> Vec<Value> {
        let store = self.store.lock().unwrap();
        store.collections.get(slug).cloned().unwrap_or_default()
    }

    /// Every request seen so far, as `METHOD /path`
    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.store.lock().unwrap().requests.clear();
    }

    /// Make every record endpoint answer with this status
    pub fn fail_with(&self, status: Option<u16>) {
        self.store.lock().unwrap().fail_with = status;
    }

    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.store.lock().unwrap().uploads.clone()
    }
}

fn failure(store: &Store) -> Option<Reply> {
    store.fail_with.map(|status| {
        (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({ "message": "Simulated failure" })),
        )
    })
}

async fn login(State(store): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut store = store.lock().unwrap();
    store.requests.push("POST /api/admin/login".to_string());

    if body["password"] == GOOD_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({ "token": "tok-abc", "user": { "role": "manager" } })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
    }
}

async fn upload(State(store): State<Shared>, Path(cloud): Path<String>, body: Bytes) -> Reply {
    let mut store = store.lock().unwrap();
    store.requests.push(format!("POST /v1_1/{}/image/upload", cloud));

    let text = String::from_utf8_lossy(&body).to_string();
    if !text.contains("upload_preset") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Upload preset must be specified" } })),
        );
    }
    store.uploads.push(body.to_vec());
    (StatusCode::OK, Json(json!({ "secure_url": UPLOADED_URL })))
}

async fn list(State(store): State<Shared>, Path(slug): Path<String>) -> Reply {
    let mut store = store.lock().unwrap();
    store.requests.push(format!("GET /api/{}", slug));
    if let Some(reply) = failure(&store) {
        return reply;
    }

    let records = store.collections.get(&slug).cloned().unwrap_or_default();
    (StatusCode::OK, Json(json!({ "success": true, "data": records })))
}

async fn create(State(store): State<Shared>, Path(slug): Path<String>, Json(body): Json<Value>) -> Reply {
    let mut store = store.lock().unwrap();
    store.requests.push(format!("POST /api/{}", slug));
    if let Some(reply) = failure(&store) {
        return reply;
    }

    store.next_id += 1;
    let mut record = body;
    record["_id"] = json!(format!("r{}", store.next_id));
    store.collections.entry(slug).or_default().push(record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn update(
    State(store): State<Shared>,
    Path((slug, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = store.lock().unwrap();
    store.requests.push(format!("PUT /api/{}/{}", slug, id));
    if let Some(reply) = failure(&store) {
        return reply;
    }

    let records = store.collections.entry(slug).or_default();
    match records.iter_mut().find(|r| r["_id"] == id.as_str()) {
        Some(record) => {
            if let (Some(target), Some(changes)) = (record.as_object_mut(), body.as_object()) {
                for (key, value) in changes {
                    target.insert(key.clone(), value.clone());
                }
            }
            (StatusCode::OK, Json(record.clone()))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Record not found" }))),
    }
}

async fn remove(State(store): State<Shared>, Path((slug, id)): Path<(String, String)>) -> Reply {
    let mut store = store.lock().unwrap();
    store.requests.push(format!("DELETE /api/{}/{}", slug, id));
    if let Some(reply) = failure(&store) {
        return reply;
    }

    let records = store.collections.entry(slug).or_default();
    let before = records.len();
    records.retain(|r| r["_id"] != id.as_str());
    if records.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Record not found" })));
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}
