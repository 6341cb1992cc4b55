//! Integration tests for project descriptors, trees, watching and relocation.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, write_file};
use projectfs_core::types::ProjectId;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["watchersEnabled"], false);
    assert_eq!(response.data()["watchedProjects"], 0);
}

#[tokio::test]
async fn test_meta_creates_missing_root() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request("GET", &format!("/files/{}/meta", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["projectId"], project.id.to_string());
    assert_eq!(
        response.data()["structure"],
        json!(["Project", "Admin", "Estimator"])
    );
    assert!(app.project_dir(&project).join(".meta.json").is_file());
}

#[tokio::test]
async fn test_unknown_project_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", &format!("/files/{}/folder-tree", ProjectId::new()), None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_project_id_is_rejected() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/files/not-a-uuid/folder-tree", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_folder_tree_shape() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("Project/Drawings/plan.pdf"), b"pdf");
    write_file(&root.join("readme.txt"), b"hi");
    std::fs::create_dir_all(root.join("Admin")).unwrap();

    let response = app
        .request("GET", &format!("/files/{}/folder-tree", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.data(),
        &json!({
            "__files": ["readme.txt"],
            "Admin": {},
            "Project": { "Drawings": { "__files": ["plan.pdf"] } }
        })
    );
}

#[tokio::test]
async fn test_invalid_project_number_yields_empty_tree() {
    let app = TestApp::new().await;
    let project = projectfs_entity::project::Project::new("garbage", "Nameless");
    app.projects.upsert(project.clone()).await;

    let response = app
        .request("GET", &format!("/files/{}/folder-tree", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data(), &json!({}));
}

#[tokio::test]
async fn test_watch_folder_tree_with_watchers_disabled() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request("GET", &format!("/files/{}/watch-folder-tree", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["watching"], false);
    assert!(response.data()["tree"].is_object());
}

#[tokio::test]
async fn test_watch_disk_returns_unchanged_when_disabled() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request(
            "GET",
            &format!("/files/{}/watch-disk?timeout=1", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["changed"], false);
}

#[tokio::test]
async fn test_watch_folder_tree_starts_watcher() {
    let app = TestApp::with_config(|c| c.watcher.enabled = true).await;
    let project = app.seed_project().await;

    let response = app
        .request("GET", &format!("/files/{}/watch-folder-tree", project.id), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["watching"], true);

    let unwatch = app
        .request("POST", &format!("/files/{}/unwatch", project.id), None)
        .await;
    assert_eq!(unwatch.data()["acknowledged"], true);
    assert_eq!(unwatch.data()["watching"], true);

    let health = app.request("GET", "/health", None).await;
    assert_eq!(health.data()["watchedProjects"], 1);
}

#[tokio::test]
async fn test_notify_folder_update_without_subscribers() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request(
            "POST",
            &format!("/files/{}/notify-folder-update", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["delivered"], 0);
    assert_eq!(response.data()["watching"], false);
}

#[tokio::test]
async fn test_relocate_moves_folder() {
    let app = TestApp::new().await;
    let mut project = app.seed_project().await;
    let old_dir = app.project_dir(&project);
    write_file(&old_dir.join("Project/brief.docx"), b"doc");
    app.request("GET", &format!("/files/{}/meta", project.id), None)
        .await;

    project.name = "Harbour Tower Stage 2".to_string();
    app.projects.upsert(project.clone()).await;

    let response = app
        .request(
            "POST",
            &format!("/files/{}/relocate", project.id),
            Some(json!({
                "previousProjectNumber": helpers::PROJECT_NUMBER,
                "previousName": helpers::PROJECT_NAME,
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(matches!(
        response.data()["action"].as_str(),
        Some("renamed" | "copied")
    ));
    let new_dir = app.project_dir(&project);
    assert!(!old_dir.exists());
    assert!(new_dir.join("Project/brief.docx").is_file());
    assert!(new_dir.join(".meta.json").is_file());
}

#[tokio::test]
async fn test_relocate_onto_existing_folder_conflicts() {
    let app = TestApp::new().await;
    let mut project = app.seed_project().await;
    let old_dir = app.project_dir(&project);
    write_file(&old_dir.join("a.txt"), b"a");

    project.name = "Occupied".to_string();
    app.projects.upsert(project.clone()).await;
    write_file(&app.project_dir(&project).join("b.txt"), b"b");

    let response = app
        .request(
            "POST",
            &format!("/files/{}/relocate", project.id),
            Some(json!({
                "previousProjectNumber": helpers::PROJECT_NUMBER,
                "previousName": helpers::PROJECT_NAME,
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(old_dir.join("a.txt").is_file());
    assert!(app.project_dir(&project).join("b.txt").is_file());
}

#[tokio::test]
async fn test_websocket_route_requires_upgrade() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/ws", None).await;

    assert!(
        response.status.is_client_error(),
        "Expected a client error, got {}",
        response.status
    );
}
