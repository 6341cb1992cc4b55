//! Integration tests for folder operations and downloads.

mod helpers;

use axum::http::{StatusCode, header};
use serde_json::json;

use helpers::{TestApp, write_file};

#[tokio::test]
async fn test_create_folder() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    std::fs::create_dir_all(app.project_dir(&project).join("Project")).unwrap();

    let response = app
        .request(
            "POST",
            &format!("/files/{}/folders", project.id),
            Some(json!({ "parentPath": "Project", "folderName": "Drawings" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["relativePath"], "Project/Drawings");
    assert!(app.project_dir(&project).join("Project/Drawings").is_dir());

    let again = app
        .request(
            "POST",
            &format!("/files/{}/folders", project.id),
            Some(json!({ "parentPath": "Project", "folderName": "Drawings" })),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_folder_rejects_traversal() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request(
            "POST",
            &format!("/files/{}/folders", project.id),
            Some(json!({ "parentPath": "../..", "folderName": "escape" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_folder_requires_name() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request(
            "POST",
            &format!("/files/{}/folders", project.id),
            Some(json!({ "folderName": "" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_rename_folder() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("Project/Old/a.txt"), b"a");

    let response = app
        .request(
            "PUT",
            &format!("/files/{}/folders/Project/Old", project.id),
            Some(json!({ "newName": "New" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["relativePath"], "Project/New");
    assert!(root.join("Project/New/a.txt").is_file());
    assert!(!root.join("Project/Old").exists());
}

#[tokio::test]
async fn test_delete_moves_entry_to_recycle_bin() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("Project/report.pdf"), b"12345");

    let response = app
        .request(
            "DELETE",
            &format!("/files/{}/folders/Project/report.pdf", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!root.join("Project/report.pdf").exists());
    let held = response.data()["recycleBinPath"].as_str().unwrap();
    assert!(std::path::Path::new(held).is_file());

    let items = app.items.all().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].file_name, "report.pdf");
    assert_eq!(items[0].file_size, 5);
    assert_eq!(items[0].deletion_method, "ui");
    assert_eq!(items[0].deletion_reason, "user_action");
    assert_eq!(items[0].deleted_by, "tester");
    assert_eq!(items[0].project_id, Some(project.id));
    assert!(app.state.watcher().is_claimed(&root.join("Project/report.pdf")));
}

#[tokio::test]
async fn test_delete_without_client_is_rejected() {
    let app = TestApp::new().await;
    let project = app.seed_orphan_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("Project/report.pdf"), b"12345");

    let response = app
        .request(
            "DELETE",
            &format!("/files/{}/folders/Project/report.pdf", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(root.join("Project/report.pdf").is_file());
    assert!(app.items.all().await.is_empty());
}

#[tokio::test]
async fn test_delete_missing_entry_is_not_found() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;

    let response = app
        .request(
            "DELETE",
            &format!("/files/{}/folders/Project/ghost.txt", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_over_file_limit_is_refused() {
    let app = TestApp::with_config(|c| c.recycle_bin.max_file_size = 4).await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("big.bin"), b"12345");

    let response = app
        .request("DELETE", &format!("/files/{}/folders/big.bin", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "STORAGE_LIMIT_EXCEEDED");
    assert!(root.join("big.bin").is_file());
    // A refused move must not hide a later external deletion.
    assert!(!app.state.watcher().is_claimed(&root.join("big.bin")));
}

#[tokio::test]
async fn test_delete_descriptor_is_rejected() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    app.request("GET", &format!("/files/{}/meta", project.id), None)
        .await;
    assert!(root.join(".meta.json").is_file());

    let response = app
        .request("DELETE", &format!("/files/{}/folders/.meta.json", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(root.join(".meta.json").is_file());
    assert!(app.items.all().await.is_empty());
}

#[tokio::test]
async fn test_download_file() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    write_file(
        &app.project_dir(&project).join("Project/notes.txt"),
        b"site notes",
    );

    let response = app
        .request_raw(
            "GET",
            &format!("/files/{}/download/Project/notes.txt", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.bytes[..], b"site notes");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_download_folder_is_rejected() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    std::fs::create_dir_all(app.project_dir(&project).join("Project")).unwrap();

    let response = app
        .request(
            "GET",
            &format!("/files/{}/download/Project", project.id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_zip() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("Project/a.txt"), b"a");
    write_file(&root.join("Admin/b.txt"), b"b");

    let response = app
        .request_raw(
            "POST",
            &format!("/files/{}/download-zip", project.id),
            Some(json!({ "paths": ["Project", "Admin/b.txt"], "fileName": "bundle.zip" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"bundle.zip\""
    );
    assert!(response.bytes.starts_with(b"PK"));
}
