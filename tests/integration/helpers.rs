//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use projectfs_api::AppState;
use projectfs_core::config::AppConfig;
use projectfs_core::traits::SystemClock;
use projectfs_core::types::ClientId;
use projectfs_database::{MemoryProjectDirectory, MemoryRecycleBinRepository};
use projectfs_entity::project::Project;

/// Project number used by [`TestApp::seed_project`].
pub const PROJECT_NUMBER: &str = "24-03001";
/// Project name used by [`TestApp::seed_project`].
pub const PROJECT_NAME: &str = "Harbour Tower";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Project records
    pub projects: Arc<MemoryProjectDirectory>,
    /// Recycle bin records
    pub items: Arc<MemoryRecycleBinRepository>,
    /// Holds the project disk and the recycle bin
    pub dir: TempDir,
}

impl TestApp {
    /// Create a new test application with watchers disabled
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application, adjusting the configuration first
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.production_root = dir.path().join("mnt-missing").display().to_string();
        config.storage.development_root = dir.path().join("projects").display().to_string();
        config.recycle_bin.path = dir.path().join("recycleBin").display().to_string();
        config.watcher.enabled = false;
        adjust(&mut config);

        std::fs::create_dir_all(&config.storage.development_root)
            .expect("Failed to create project root");
        std::fs::create_dir_all(&config.recycle_bin.path).expect("Failed to create recycle bin");

        let projects = Arc::new(MemoryProjectDirectory::new());
        let items = Arc::new(MemoryRecycleBinRepository::new());
        let state = AppState::assemble(
            config,
            projects.clone(),
            items.clone(),
            SystemClock::shared(),
            None,
        );
        let router = projectfs_api::build_app(state.clone());

        Self {
            router,
            state,
            projects,
            items,
            dir,
        }
    }

    /// The project disk root
    pub fn disk_root(&self) -> PathBuf {
        self.dir.path().join("projects")
    }

    /// Where [`TestApp::seed_project`] projects live on disk
    pub fn project_dir(&self, project: &Project) -> PathBuf {
        self.disk_root()
            .join(project.region.as_deref().unwrap_or("AU"))
            .join("2024")
            .join("03. Mar")
            .join(project.folder_name())
    }

    /// Insert a project owned by a fresh client
    pub async fn seed_project(&self) -> Project {
        let project = Project::new(PROJECT_NUMBER, PROJECT_NAME).with_client(ClientId::new());
        self.projects.upsert(project.clone()).await;
        project
    }

    /// Insert a project that has no owning client
    pub async fn seed_orphan_project(&self) -> Project {
        let project = Project::new(PROJECT_NUMBER, PROJECT_NAME);
        self.projects.upsert(project.clone()).await;
        project
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let raw = self.request_raw(method, path, body).await;
        let body: Value = serde_json::from_slice(&raw.bytes).unwrap_or(Value::Null);
        TestResponse {
            status: raw.status,
            body,
        }
    }

    /// Make an HTTP request and keep the body as bytes
    pub async fn request_raw(&self, method: &str, path: &str, body: Option<Value>) -> RawResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("x-user-id", "tester")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        RawResponse {
            status,
            headers,
            bytes,
        }
    }
}

/// Write `contents` to `path`, creating parents
pub fn write_file(path: &Path, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().expect("file has a parent")).expect("create parents");
    std::fs::write(path, contents).expect("write file");
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` envelope of a successful response
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// Unparsed response
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes
    pub bytes: Bytes,
}
