mod common;

use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use common::{file_part, spawn_app, stored_name, token_for, PNG_BYTES};
use entry_kit::routes::entries::EntryResponse;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn create_stores_file_and_serves_it() {
    let app = spawn_app().await;
    let owner = Uuid::new_v4();
    let token = token_for(owner);
    let project = app.create_project(&token, "Alpha").await;

    let form = MultipartForm::new()
        .add_text("name", "banner")
        .add_text("projectId", project["id"].as_str().unwrap())
        .add_part("file", file_part("banner.png"));
    let response = app
        .server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Entry created successfully");

    let entry: EntryResponse = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(entry.name, "banner");
    assert_eq!(entry.user_id, owner);
    assert_eq!(entry.api_key, project["apiKey"].as_str().unwrap());
    assert_eq!(entry.project.slug, "alpha");
    assert!(entry.img_url.contains("/uploads/"));
    assert!(entry.img_url.ends_with(".png"));

    let stored = app.upload_path(&entry.img_url);
    assert_eq!(std::fs::read(&stored).unwrap(), PNG_BYTES);

    let served = app
        .server
        .get(&format!("/uploads/{}", stored_name(&entry.img_url)))
        .await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn create_under_unknown_project_leaves_nothing_behind() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());

    let form = MultipartForm::new()
        .add_text("name", "banner")
        .add_text("projectId", Uuid::new_v4().to_string())
        .add_part("file", file_part("banner.png"));
    let response = app
        .server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Project not found");
    assert_eq!(app.stored_file_count(), 0);

    let response = app.server.get("/entry").authorization_bearer(&token).await;
    assert_eq!(response.json::<Value>()["data"], json!([]));
}

#[tokio::test]
async fn create_under_foreign_project_is_not_found() {
    let app = spawn_app().await;
    let alice = token_for(Uuid::new_v4());
    let bob = token_for(Uuid::new_v4());
    let project = app.create_project(&alice, "Alpha").await;

    let form = MultipartForm::new()
        .add_text("name", "banner")
        .add_text("projectId", project["id"].as_str().unwrap())
        .add_part("file", file_part("banner.png"));
    app.server
        .post("/entry")
        .authorization_bearer(&bob)
        .multipart(form)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn create_requires_file_and_valid_fields() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());
    let project = app.create_project(&token, "Alpha").await;
    let project_id = project["id"].as_str().unwrap();

    let without_file = MultipartForm::new()
        .add_text("name", "banner")
        .add_text("projectId", project_id);
    let response = app
        .server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(without_file)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "No file field found");

    let bad_project_id = MultipartForm::new()
        .add_text("name", "banner")
        .add_text("projectId", "not-a-uuid")
        .add_part("file", file_part("banner.png"));
    app.server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(bad_project_id)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let blank_name = MultipartForm::new()
        .add_text("name", " ")
        .add_text("projectId", project_id)
        .add_part("file", file_part("banner.png"));
    app.server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(blank_name)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn duplicate_entry_name_conflicts_and_discards_upload() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());
    let project = app.create_project(&token, "Alpha").await;
    let project_id = project["id"].as_str().unwrap();
    app.create_entry(&token, project_id, "banner").await;

    let form = MultipartForm::new()
        .add_text("name", "banner")
        .add_text("projectId", project_id)
        .add_part("file", file_part("banner.png"));
    let response = app
        .server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "An entry with this name already exists"
    );
    assert_eq!(app.stored_file_count(), 1);
}

#[tokio::test]
async fn listings_are_owner_scoped() {
    let app = spawn_app().await;
    let alice = token_for(Uuid::new_v4());
    let bob = token_for(Uuid::new_v4());
    let alpha = app.create_project(&alice, "Alpha").await;
    let beta = app.create_project(&alice, "Beta").await;
    let alpha_id = alpha["id"].as_str().unwrap();

    app.create_entry(&alice, alpha_id, "first").await;
    app.create_entry(&alice, beta["id"].as_str().unwrap(), "second").await;

    let all = app.server.get("/entry").authorization_bearer(&alice).await;
    let all: Vec<EntryResponse> = serde_json::from_value(all.json::<Value>()["data"].clone()).unwrap();
    assert_eq!(all.len(), 2);

    let scoped = app
        .server
        .get(&format!("/entry/project/{alpha_id}"))
        .authorization_bearer(&alice)
        .await;
    let scoped: Vec<EntryResponse> =
        serde_json::from_value(scoped.json::<Value>()["data"].clone()).unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].name, "first");
    assert_eq!(scoped[0].project.slug, "alpha");

    let foreign = app.server.get("/entry").authorization_bearer(&bob).await;
    assert_eq!(foreign.json::<Value>()["data"], json!([]));

    let foreign = app
        .server
        .get(&format!("/entry/project/{alpha_id}"))
        .authorization_bearer(&bob)
        .await;
    foreign.assert_status_ok();
    assert_eq!(foreign.json::<Value>()["data"], json!([]));
}

#[tokio::test]
async fn update_moves_entry_and_restamps_api_key() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());
    let alpha = app.create_project(&token, "Alpha").await;
    let beta = app.create_project(&token, "Beta").await;
    let entry = app
        .create_entry(&token, alpha["id"].as_str().unwrap(), "banner")
        .await;

    let response = app
        .server
        .put(&format!("/entry/{}", entry["id"].as_str().unwrap()))
        .authorization_bearer(&token)
        .json(&json!({ "name": "hero", "projectId": beta["id"] }))
        .await;
    response.assert_status_ok();

    let updated: EntryResponse =
        serde_json::from_value(response.json::<Value>()["data"].clone()).unwrap();
    assert_eq!(updated.name, "hero");
    assert_eq!(updated.project.slug, "beta");
    assert_eq!(updated.api_key, beta["apiKey"].as_str().unwrap());
    assert_eq!(updated.img_url, entry["imgUrl"].as_str().unwrap());
}

#[tokio::test]
async fn update_of_foreign_entry_is_not_found() {
    let app = spawn_app().await;
    let alice = token_for(Uuid::new_v4());
    let bob = token_for(Uuid::new_v4());
    let alpha = app.create_project(&alice, "Alpha").await;
    let bobs = app.create_project(&bob, "Bobs").await;
    let entry = app
        .create_entry(&alice, alpha["id"].as_str().unwrap(), "banner")
        .await;

    app.server
        .put(&format!("/entry/{}", entry["id"].as_str().unwrap()))
        .authorization_bearer(&bob)
        .json(&json!({ "name": "stolen", "projectId": bobs["id"] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_entry_and_file() {
    let app = spawn_app().await;
    let alice = token_for(Uuid::new_v4());
    let bob = token_for(Uuid::new_v4());
    let project = app.create_project(&alice, "Alpha").await;
    let entry = app
        .create_entry(&alice, project["id"].as_str().unwrap(), "banner")
        .await;
    let path = format!("/entry/{}", entry["id"].as_str().unwrap());
    let stored = app.upload_path(entry["imgUrl"].as_str().unwrap());

    app.server
        .delete(&path)
        .authorization_bearer(&bob)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(stored.exists());

    let response = app.server.delete(&path).authorization_bearer(&alice).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "message": "Entry deleted successfully" }));
    assert!(!stored.exists());

    app.server
        .delete(&path)
        .authorization_bearer(&alice)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_entry_id_is_bad_request() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());

    app.server
        .delete("/entry/not-a-uuid")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());
    let project = app.create_project(&token, "Alpha").await;

    let oversized = axum_test::multipart::Part::bytes(vec![0u8; 2 * 1024 * 1024])
        .file_name("huge.bin")
        .mime_type("application/octet-stream");
    let form = MultipartForm::new()
        .add_text("name", "huge")
        .add_text("projectId", project["id"].as_str().unwrap())
        .add_part("file", oversized);

    app.server
        .post("/entry")
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn renaming_onto_existing_name_conflicts() {
    let app = spawn_app().await;
    let token = token_for(Uuid::new_v4());
    let project = app.create_project(&token, "Alpha").await;
    let project_id = project["id"].as_str().unwrap();
    app.create_entry(&token, project_id, "banner").await;
    let second = app.create_entry(&token, project_id, "hero").await;

    let response = app
        .server
        .put(&format!("/entry/{}", second["id"].as_str().unwrap()))
        .authorization_bearer(&token)
        .json(&json!({ "name": "banner", "projectId": project_id }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "An entry with this name already exists"
    );

    let listed = app.server.get("/entry").authorization_bearer(&token).await;
    let names: Vec<String> = serde_json::from_value::<Vec<EntryResponse>>(
        listed.json::<Value>()["data"].clone(),
    )
    .unwrap()
    .into_iter()
    .map(|e| e.name)
    .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"hero".to_string()));
}
