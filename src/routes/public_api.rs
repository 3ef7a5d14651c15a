//! API-key routes. The key in the path is the only credential: whoever holds
//! it can read, create, update and delete every entry of that project.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::response::{ApiResponse, MessageResponse};
use crate::routes::entries::{to_responses, EntryResponse};
use crate::routes::upload::{persist_with_upload, public_base_url, UploadForm};
use crate::state::AppState;
use crate::validation::require_name;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddEntryRequest {
    #[schema(example = "logo-banner")]
    name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/public-api/{api_key}/entries",
    params(
        ("api_key" = String, Path, description = "Project API key")
    ),
    responses(
        (status = 200, description = "Entries fetched successfully", body = [EntryResponse]),
        (status = 404, description = "No entries found for this API key")
    ),
    tag = "Public API"
)]
pub async fn get_entries(
    State(state): State<AppState>,
    AppPath(api_key): AppPath<String>,
) -> Result<Json<ApiResponse<Vec<EntryResponse>>>, AppError> {
    let entries = state.entries.find_entries_by_api_key(&api_key).await?;
    if entries.is_empty() {
        return Err(AppError::NotFound("No entries found for this API key".to_string()));
    }

    Ok(Json(ApiResponse::new("Entries fetched successfully", to_responses(entries))))
}

#[utoipa::path(
    get,
    path = "/public-api/{api_key}/entry",
    params(
        ("api_key" = String, Path, description = "Project API key")
    ),
    responses(
        (status = 200, description = "Oldest entry under the key", body = EntryResponse),
        (status = 404, description = "Entry not found")
    ),
    tag = "Public API"
)]
pub async fn get_single_entry(
    State(state): State<AppState>,
    AppPath(api_key): AppPath<String>,
) -> Result<Json<ApiResponse<EntryResponse>>, AppError> {
    let entry = state
        .entries
        .find_one_by_api_key(&api_key)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

    Ok(Json(ApiResponse::new("Entry fetched successfully", entry.into())))
}

#[utoipa::path(
    post,
    path = "/public-api/{api_key}/entries",
    params(
        ("api_key" = String, Path, description = "Project API key")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Fields: name, file"),
    responses(
        (status = 201, description = "Entry created successfully", body = EntryResponse),
        (status = 400, description = "Validation failed or file missing"),
        (status = 404, description = "Project not found"),
        (status = 409, description = "Entry name already taken")
    ),
    tag = "Public API"
)]
pub async fn add_entry(
    State(state): State<AppState>,
    AppPath(api_key): AppPath<String>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponse>>), AppError> {
    let mut form = UploadForm::read(multipart?).await?;
    let name = require_name("name", form.text("name"))?;
    let file = form.take_file()?;

    // Unknown keys are rejected before anything touches the disk.
    if state.projects.find_by_api_key(&api_key).await?.is_none() {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    let base_url = public_base_url(&headers, &uri, &state.config);
    let detail = persist_with_upload(&state.uploads, file, &base_url, |img_url| {
        state.entries.add_by_api_key(&api_key, name, img_url)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Entry created successfully", detail.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/public-api/{api_key}/entries/{entry_id}",
    params(
        ("api_key" = String, Path, description = "Project API key"),
        ("entry_id" = String, Path, description = "Entry ID")
    ),
    request_body = AddEntryRequest,
    responses(
        (status = 200, description = "Entry updated successfully", body = EntryResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Public API"
)]
pub async fn update_entry_by_key(
    State(state): State<AppState>,
    AppPath((api_key, entry_id)): AppPath<(String, Uuid)>,
    AppJson(payload): AppJson<AddEntryRequest>,
) -> Result<Json<ApiResponse<EntryResponse>>, AppError> {
    let name = require_name("name", payload.name.as_deref())?;
    let detail = state.entries.update_by_api_key(&api_key, entry_id, name).await?;

    Ok(Json(ApiResponse::new("Entry updated successfully", detail.into())))
}

#[utoipa::path(
    delete,
    path = "/public-api/{api_key}/entries/{entry_id}",
    params(
        ("api_key" = String, Path, description = "Project API key"),
        ("entry_id" = String, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted successfully", body = MessageResponse),
        (status = 404, description = "Entry not found")
    ),
    tag = "Public API"
)]
pub async fn delete_entry_by_key(
    State(state): State<AppState>,
    AppPath((api_key, entry_id)): AppPath<(String, Uuid)>,
) -> Result<Json<MessageResponse>, AppError> {
    state.entries.remove_by_api_key(&api_key, entry_id).await?;

    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}
