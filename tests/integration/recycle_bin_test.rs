//! Integration tests for the recycle bin lifecycle over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, write_file};
use projectfs_core::types::RecycleItemId;
use projectfs_entity::project::Project;

/// Delete `relative` through the API and return the new item id.
async fn recycle(app: &TestApp, project: &Project, relative: &str) -> String {
    let response = app
        .request(
            "DELETE",
            &format!("/files/{}/folders/{relative}", project.id),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.data()["recycleBinId"]
        .as_str()
        .expect("recycleBinId")
        .to_string()
}

#[tokio::test]
async fn test_list_and_summary() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("a.txt"), b"aaa");
    write_file(&root.join("Project/Sub/b.txt"), b"bbbbb");
    recycle(&app, &project, "a.txt").await;
    recycle(&app, &project, "Project/Sub").await;

    let listing = app.request("GET", "/recycle-bin/items?limit=10", None).await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.data()["items"].as_array().unwrap().len(), 2);
    assert_eq!(listing.data()["pagination"]["total"], 2);
    assert_eq!(listing.data()["summary"]["totalSize"], 8);
    assert_eq!(listing.data()["summary"]["fileCount"], 1);
    assert_eq!(listing.data()["summary"]["folderCount"], 1);

    let folders = app
        .request("GET", "/recycle-bin/items?fileType=folder", None)
        .await;
    let items = folders.data()["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["fileName"], "Sub");

    let client = project.client_id.unwrap();
    let by_client = app
        .request("GET", &format!("/recycle-bin/client/{client}"), None)
        .await;
    assert_eq!(by_client.data()["pagination"]["total"], 2);

    let summary = app
        .request("GET", &format!("/recycle-bin/summary?clientId={client}"), None)
        .await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.data()["totalFiles"], 2);
}

#[tokio::test]
async fn test_restore_to_original_path() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let original = app.project_dir(&project).join("Project/plan.pdf");
    write_file(&original, b"plan");
    let id = recycle(&app, &project, "Project/plan.pdf").await;
    assert!(!original.exists());

    let response = app
        .request("POST", &format!("/recycle-bin/restore/{id}"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["restoredPath"], original.display().to_string());
    assert_eq!(std::fs::read(&original).unwrap(), b"plan");

    let item = app
        .request("GET", &format!("/recycle-bin/items/{id}"), None)
        .await;
    assert_eq!(item.data()["canRestore"], false);
    assert_eq!(item.data()["restoredBy"], "tester");

    let again = app
        .request("POST", &format!("/recycle-bin/restore/{id}"), None)
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_restore_onto_occupied_path_gets_suffix() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let original = app.project_dir(&project).join("plan.pdf");
    write_file(&original, b"old");
    let id = recycle(&app, &project, "plan.pdf").await;
    write_file(&original, b"new");

    let response = app
        .request("POST", &format!("/recycle-bin/restore/{id}"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let restored = original.with_file_name("plan_restored_1.pdf");
    assert_eq!(response.data()["restoredPath"], restored.display().to_string());
    assert_eq!(std::fs::read(&restored).unwrap(), b"old");
    assert_eq!(std::fs::read(&original).unwrap(), b"new");
}

#[tokio::test]
async fn test_restore_outside_disk_is_rejected() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    write_file(&app.project_dir(&project).join("plan.pdf"), b"plan");
    let id = recycle(&app, &project, "plan.pdf").await;

    let response = app
        .request(
            "POST",
            &format!("/recycle-bin/restore/{id}"),
            Some(json!({ "restorePath": "/etc/plan.pdf" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.items.all().await[0].can_restore);
}

#[tokio::test]
async fn test_bulk_restore_reports_failures() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    write_file(&app.project_dir(&project).join("a.txt"), b"a");
    let id = recycle(&app, &project, "a.txt").await;
    let missing = RecycleItemId::new().to_string();

    let response = app
        .request(
            "POST",
            "/recycle-bin/restore-bulk",
            Some(json!({ "ids": [id, missing] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["restored"].as_array().unwrap().len(), 1);
    let failures = response.data()["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["id"], missing);
}

#[tokio::test]
async fn test_permanent_delete() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    write_file(&app.project_dir(&project).join("a.txt"), b"abcd");
    let id = recycle(&app, &project, "a.txt").await;
    let held = app.items.all().await[0].recycle_bin_path.clone();

    let response = app
        .request(
            "DELETE",
            &format!("/recycle-bin/permanent/{id}"),
            Some(json!({ "reason": "cleanup" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deletedCount"], 1);
    assert_eq!(response.data()["totalSizeFreed"], 4);
    assert!(!std::path::Path::new(&held).exists());

    let listing = app.request("GET", "/recycle-bin/items", None).await;
    assert_eq!(listing.data()["pagination"]["total"], 0);

    let restore = app
        .request("POST", &format!("/recycle-bin/restore/{id}"), None)
        .await;
    assert_eq!(restore.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_permanent_delete_bulk_requires_ids() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "DELETE",
            "/recycle-bin/permanent-bulk",
            Some(json!({ "ids": [] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_permanent_delete_bulk() {
    let app = TestApp::new().await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("a.txt"), b"aa");
    write_file(&root.join("b.txt"), b"bbb");
    let first = recycle(&app, &project, "a.txt").await;
    let second = recycle(&app, &project, "b.txt").await;

    let response = app
        .request(
            "DELETE",
            "/recycle-bin/permanent-bulk",
            Some(json!({ "ids": [first, second] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deletedCount"], 2);
    assert_eq!(response.data()["totalSizeFreed"], 5);
}

#[tokio::test]
async fn test_cleanup_purges_expired_items() {
    let app = TestApp::with_config(|c| c.recycle_bin.max_retention_days = 0).await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("old.txt"), b"1234");
    write_file(&root.join("new.txt"), b"12");
    recycle(&app, &project, "old.txt").await;
    recycle(&app, &project, "new.txt").await;

    let response = app.request("POST", "/recycle-bin/cleanup", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["expiredDeleted"], 2);
    assert_eq!(response.data()["sizeLimitDeleted"], 0);
    assert_eq!(response.data()["totalSizeFreed"], 6);
    assert_eq!(response.data()["remainingSize"], 0);
    assert!(app.items.all().await.iter().all(|i| !i.can_restore));
}

#[tokio::test]
async fn test_intercept_over_total_cap_is_refused() {
    let app = TestApp::with_config(|c| c.recycle_bin.max_total_size = 5).await;
    let project = app.seed_project().await;
    let root = app.project_dir(&project);
    write_file(&root.join("a.txt"), b"1234");
    write_file(&root.join("b.txt"), b"12");
    recycle(&app, &project, "a.txt").await;

    let response = app
        .request("DELETE", &format!("/files/{}/folders/b.txt", project.id), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "STORAGE_LIMIT_EXCEEDED");
    assert!(root.join("b.txt").is_file());
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "GET",
            &format!("/recycle-bin/items/{}", RecycleItemId::new()),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
