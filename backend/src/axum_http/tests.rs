use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use crates::domain::{
    repositories::candidates::MockCandidateRepository,
    value_objects::{candidates::InsertCandidateModel, enums::file_slots::FileSlot},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    axum_http::{http_serve, routers},
    usecases::test_support::InMemoryObjectStorage,
};

const BOUNDARY: &str = "intake-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn app(repository: MockCandidateRepository, storage: InMemoryObjectStorage) -> Router {
    http_serve::app(routers::candidates::router(
        Arc::new(repository),
        Arc::new(storage),
    ))
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn is_generated_name(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|name| name.len() == 32 && name.chars().all(|c| c.is_ascii_hexdigit()))
}

#[tokio::test]
async fn root_reports_liveness() {
    let response = app(MockCandidateRepository::new(), InMemoryObjectStorage::default())
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Backend is running");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = app(MockCandidateRepository::new(), InMemoryObjectStorage::default())
        .oneshot(Request::get("/candidates").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "NOT_FOUND");
}

/// Mock repository that keeps every inserted record for later inspection.
fn recording_repository() -> (MockCandidateRepository, Arc<Mutex<Vec<InsertCandidateModel>>>) {
    let inserted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&inserted);

    let mut repository = MockCandidateRepository::new();
    repository.expect_insert().times(1).returning(move |candidate| {
        sink.lock().unwrap().push(candidate);
        Box::pin(async { Ok(Uuid::new_v4()) })
    });

    (repository, inserted)
}

#[tokio::test]
async fn upload_stores_files_and_returns_their_names() {
    let (repository, inserted) = recording_repository();

    let storage = InMemoryObjectStorage::default();
    let response = app(repository, storage.clone())
        .oneshot(upload_request(&[
            Part::Text("firstName", "Ada"),
            Part::Text("lastName", "Lovelace"),
            Part::Text("position", "Engineer"),
            Part::Text("currentPosition", "Analyst"),
            Part::Text("experience", "3.5"),
            Part::File("resume", "cv.pdf", "application/pdf", b"%PDF-1.4 resume"),
            Part::File("video", "interview-video.webm", "video/webm", b"\x1a\x45\xdf\xa3"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Upload successful");
    assert!(is_generated_name(&body["resume"]));
    assert!(is_generated_name(&body["video"]));

    let resume_name = body["resume"].as_str().unwrap();
    assert_eq!(storage.bytes_of(resume_name).unwrap(), b"%PDF-1.4 resume");
    assert_eq!(storage.len(), 2);

    let inserted = inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    let candidate = &inserted[0];
    assert_eq!(candidate.first_name.as_deref(), Some("Ada"));
    assert_eq!(candidate.last_name.as_deref(), Some("Lovelace"));
    assert_eq!(candidate.position.as_deref(), Some("Engineer"));
    assert_eq!(candidate.current_position.as_deref(), Some("Analyst"));
    assert_eq!(candidate.experience, Some(3.5));
    assert_eq!(candidate.resume_file_name.as_deref(), body["resume"].as_str());
    assert_eq!(candidate.video_file_name.as_deref(), body["video"].as_str());
}

#[tokio::test]
async fn upload_treats_blank_file_input_as_absent() {
    let (repository, inserted) = recording_repository();

    let storage = InMemoryObjectStorage::default();
    let response = app(repository, storage.clone())
        .oneshot(upload_request(&[
            Part::Text("firstName", "Ada"),
            Part::File("resume", "", "application/octet-stream", b""),
            Part::File("video", "interview-video.webm", "video/webm", b"webm"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["resume"], Value::Null);
    assert!(is_generated_name(&body["video"]));
    assert_eq!(storage.len(), 1);

    let inserted = inserted.lock().unwrap();
    assert_eq!(inserted[0].resume_file_name, None);
    assert_eq!(inserted[0].video_file_name.as_deref(), body["video"].as_str());
}

#[tokio::test]
async fn upload_without_resume_records_null() {
    let mut repository = MockCandidateRepository::new();
    repository
        .expect_insert()
        .withf(|candidate| candidate.resume_file_name.is_none() && candidate.video_file_name.is_some())
        .times(1)
        .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

    let response = app(repository, InMemoryObjectStorage::default())
        .oneshot(upload_request(&[
            Part::Text("firstName", "Ada"),
            Part::File("video", "interview-video.webm", "video/webm", b"webm"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["resume"], Value::Null);
    assert!(is_generated_name(&body["video"]));
}

#[tokio::test]
async fn upload_rejects_second_video_part() {
    let mut repository = MockCandidateRepository::new();
    repository.expect_insert().never();

    let response = app(repository, InMemoryObjectStorage::default())
        .oneshot(upload_request(&[
            Part::File("video", "a.webm", "video/webm", b"one"),
            Part::File("video", "b.webm", "video/webm", b"two"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("video"));
}

#[tokio::test]
async fn upload_rejects_non_numeric_experience_as_client_error() {
    let mut repository = MockCandidateRepository::new();
    repository.expect_insert().never();

    let storage = InMemoryObjectStorage::default();
    let response = app(repository, storage.clone())
        .oneshot(upload_request(&[
            Part::Text("experience", "a decade"),
            Part::File("video", "interview-video.webm", "video/webm", b"webm"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("experience"));
    assert_eq!(storage.len(), 0);
}

#[tokio::test]
async fn upload_rejects_non_multipart_body() {
    let mut repository = MockCandidateRepository::new();
    repository.expect_insert().never();

    let response = app(repository, InMemoryObjectStorage::default())
        .oneshot(json_request("/upload", json!({ "firstName": "Ada" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_reports_storage_failure_as_server_error() {
    let mut repository = MockCandidateRepository::new();
    repository.expect_insert().never();

    let response = app(repository, InMemoryObjectStorage::failing_for(FileSlot::Resume))
        .oneshot(upload_request(&[Part::File(
            "resume",
            "cv.pdf",
            "application/pdf",
            b"%PDF",
        )]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Upload failed" }));
}

#[tokio::test]
async fn upload_metadata_failure_leaves_objects_behind() {
    let mut repository = MockCandidateRepository::new();
    repository
        .expect_insert()
        .times(1)
        .returning(|_| Box::pin(async { Err(anyhow::anyhow!("relation \"candidates\" does not exist")) }));

    let storage = InMemoryObjectStorage::default();
    let response = app(repository, storage.clone())
        .oneshot(upload_request(&[
            Part::File("resume", "cv.pdf", "application/pdf", b"%PDF"),
            Part::File("video", "interview-video.webm", "video/webm", b"webm"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Upload failed" }));
    assert_eq!(storage.len(), 2);
}

#[tokio::test]
async fn add_candidate_creates_record() {
    let mut repository = MockCandidateRepository::new();
    repository
        .expect_insert()
        .times(1)
        .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

    let response = app(repository, InMemoryObjectStorage::default())
        .oneshot(json_request(
            "/addcandidate",
            json!({ "firstname": "Grace", "lastname": "Hopper" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Candidate added successfully" })
    );
}

#[tokio::test]
async fn add_candidate_without_lastname_is_rejected_and_not_persisted() {
    let mut repository = MockCandidateRepository::new();
    repository.expect_insert().never();

    let response = app(repository, InMemoryObjectStorage::default())
        .oneshot(json_request("/addcandidate", json!({ "firstname": "Grace" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "Firstname and Lastname are required");
}

#[tokio::test]
async fn add_candidate_store_failure_is_server_error() {
    let mut repository = MockCandidateRepository::new();
    repository
        .expect_insert()
        .returning(|_| Box::pin(async { Err(anyhow::anyhow!("pool timed out")) }));

    let response = app(repository, InMemoryObjectStorage::default())
        .oneshot(json_request(
            "/addcandidate",
            json!({ "firstname": "Grace", "lastname": "Hopper" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Internal server error");
}

#[tokio::test]
async fn submit_data_acknowledges() {
    let response = app(MockCandidateRepository::new(), InMemoryObjectStorage::default())
        .oneshot(json_request("/submitdata", json!({ "name": "Ada" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Data received successfully" })
    );
}
