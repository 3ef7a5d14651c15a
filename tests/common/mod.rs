#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use entry_kit::config::Config;
use entry_kit::middleware::auth::issue_token;
use entry_kit::{create_routes, AppState};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";

pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
    pub uploads: TempDir,
}

pub fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        host: std::net::Ipv4Addr::LOCALHOST.into(),
        port: 3000,
        upload_dir,
        max_upload_bytes: 1024 * 1024,
        db_max_connections: 1,
        cors_origins: Vec::new(),
        trust_proxy: false,
    }
}

pub async fn spawn_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let uploads = TempDir::new().unwrap();
    let state = AppState::new(db.clone(), test_config(uploads.path().to_path_buf()));
    let server = TestServer::new(create_routes(state)).unwrap();

    TestApp {
        server,
        db,
        uploads,
    }
}

pub fn token_for(user_id: Uuid) -> String {
    issue_token(JWT_SECRET, user_id, 3600).unwrap()
}

pub fn file_part(file_name: &str) -> Part {
    Part::bytes(PNG_BYTES.to_vec())
        .file_name(file_name)
        .mime_type("image/png")
}

/// Name of the stored file behind an entry's `imgUrl`.
pub fn stored_name(img_url: &str) -> String {
    img_url.rsplit('/').next().unwrap().to_string()
}

impl TestApp {
    pub fn upload_path(&self, img_url: &str) -> PathBuf {
        self.uploads.path().join(stored_name(img_url))
    }

    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.uploads.path()).unwrap().count()
    }

    /// Creates a project and returns the `data` object of the response.
    pub async fn create_project(&self, token: &str, name: &str) -> Value {
        let response = self
            .server
            .post("/project")
            .authorization_bearer(token)
            .json(&json!({ "name": name, "description": format!("{name} assets") }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    /// Uploads an entry through the session API and returns its `data` object.
    pub async fn create_entry(&self, token: &str, project_id: &str, name: &str) -> Value {
        let form = MultipartForm::new()
            .add_text("name", name)
            .add_text("projectId", project_id)
            .add_part("file", file_part("logo.png"));
        let response = self
            .server
            .post("/entry")
            .authorization_bearer(token)
            .multipart(form)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}
