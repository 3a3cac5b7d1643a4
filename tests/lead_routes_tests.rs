mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::MemoryDrive;
use leaddrive::server::{LeadDriveState, leaddrive_router};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn multipart_request(uri: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "leaddrive-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

#[tokio::test]
async fn lead_drive_routes_follow_the_http_contract() {
    let (db, path) = common::spawn_db("routes").await;
    let drive = MemoryDrive::new();
    let service = common::build_service(db, drive.clone(), common::test_settings());
    let app = leaddrive_router(LeadDriveState::new(service));

    // Unknown lead -> 404 failure payload.
    let (status, body) = call(&app, "POST", "/leads/42/drive/create-folder", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = call(
        &app,
        "PUT",
        "/leads/42",
        Some(json!({"title": "Kitchen inquiry", "person_name": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // No folder yet: listing answers 200 with success=false.
    let (status, body) = call(&app, "GET", "/leads/42/drive/files", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["files"], json!([]));

    let (status, body) = call(&app, "POST", "/leads/42/drive/move-to-projects", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(drive.total_calls(), 0);

    let (status, body) = call(&app, "POST", "/leads/42/drive/create-folder", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["client_number"], 1316);
    assert_eq!(body["new_title"], "1316 - UNKNOWN");
    let folder_url = body["folder_url"].as_str().unwrap().to_string();

    let (status, body) = call(&app, "POST", "/leads/42/drive/create-folder", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["folder_url"], folder_url.as_str());

    // Upload then list.
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "/leads/42/drive/upload",
            "file",
            "notes.txt",
            b"hello",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    let file_id = body["file"]["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(multipart_request(
            "/leads/42/drive/upload",
            "attachment",
            "notes.txt",
            b"hello",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(&app, "GET", "/leads/42/drive/files", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["files"][0]["id"], file_id.as_str());
    assert_eq!(body["files"][0]["mimeType"], "text/plain");
    assert_eq!(body["files"][0]["isFolder"], false);

    let (status, _) = call(&app, "DELETE", "/leads/42/drive/files", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, body) = call(
        &app,
        "DELETE",
        "/leads/42/drive/files",
        Some(json!({"file_id": file_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(drive.delete_calls.load(Ordering::SeqCst), 1);

    // Projects.
    let (status, _) = call(&app, "POST", "/leads/42/drive/projects", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, body) = call(
        &app,
        "POST",
        "/leads/42/drive/projects",
        Some(json!({"project_name": "kitchen remodel"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["project_number"], 1);
    let (_, body) = call(
        &app,
        "POST",
        "/leads/42/drive/projects",
        Some(json!({"project_name": "Deck"})),
    )
    .await;
    assert_eq!(body["project"]["project_number"], 2);

    let (status, body) = call(&app, "GET", "/leads/42/drive/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projects"][0]["project_number"], 1);
    assert_eq!(body["projects"][1]["project_name"], "Deck");

    // Move, then status.
    let (status, body) = call(&app, "POST", "/leads/42/drive/move-to-projects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let (status, _) = call(&app, "POST", "/leads/42/drive/move-to-projects", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, "GET", "/leads/42/drive", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lead"]["state"], "moved_to_projects");
    assert_eq!(body["lead"]["can_move"], false);
    assert_eq!(body["lead"]["client_number_display"], "1316");

    let (status, _) = call(&app, "DELETE", "/leads/42", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "DELETE", "/leads/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(path).await;
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let (db, path) = common::spawn_db("routes-malformed").await;
    let drive = MemoryDrive::new();
    let service = common::build_service(db, drive, common::test_settings());
    let app = leaddrive_router(LeadDriveState::new(service));

    let (status, _) = call(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/leads/abc/drive", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/leads/1")
                .header("content-type", "application/json")
                .header("x-request-id", "req-123")
                .body(Body::from("not-json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.headers()["x-request-id"], "req-123");

    let (status, _) = call(&app, "PUT", "/leads/1", Some(json!({"title": "  "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    common::cleanup(path).await;
}

#[tokio::test]
async fn unknown_and_unprovisioned_leads_are_reported_before_bad_input() {
    let (db, path) = common::spawn_db("routes-check-order").await;
    let drive = MemoryDrive::new();
    let service = common::build_service(db, drive, common::test_settings());
    let app = leaddrive_router(LeadDriveState::new(service));

    let upload_status = |uri: &'static str| {
        let app = app.clone();
        async move {
            app.oneshot(multipart_request(uri, "attachment", "notes.txt", b"hello"))
                .await
                .unwrap()
                .status()
        }
    };

    // Unknown lead.
    let (status, _) = call(&app, "POST", "/leads/999/drive/projects", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(upload_status("/leads/999/drive/upload").await, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "POST", "/leads/999/drive/upload", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "DELETE", "/leads/999/drive/files", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Known lead without a folder.
    let (status, _) = call(&app, "PUT", "/leads/6", Some(json!({"title": "Lead"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, "POST", "/leads/6/drive/projects", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(upload_status("/leads/6/drive/upload").await, StatusCode::BAD_REQUEST);

    // Provisioned: now the input itself is judged.
    let (status, _) = call(&app, "POST", "/leads/6/drive/create-folder", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "POST", "/leads/6/drive/projects", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        upload_status("/leads/6/drive/upload").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );

    common::cleanup(path).await;
}

#[tokio::test]
async fn remote_failures_map_to_bad_gateway() {
    let (db, path) = common::spawn_db("routes-remote").await;
    let drive = MemoryDrive::new();
    let service = common::build_service(db, drive.clone(), common::test_settings());
    let app = leaddrive_router(LeadDriveState::new(service));

    let (status, _) = call(&app, "PUT", "/leads/3", Some(json!({"title": "Lead"}))).await;
    assert_eq!(status, StatusCode::OK);

    drive.fail_all.store(true, Ordering::SeqCst);
    let (status, body) = call(&app, "POST", "/leads/3/drive/create-folder", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Drive"));

    common::cleanup(path).await;
}
