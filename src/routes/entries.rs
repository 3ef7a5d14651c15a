use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, MessageResponse};
use crate::routes::projects::ProjectResponse;
use crate::routes::upload::{persist_with_upload, public_base_url, UploadForm};
use crate::services::entries::{EntryDetail, EntryInput};
use crate::state::AppState;
use crate::validation::{require_name, require_uuid};

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[schema(example = "logo-banner")]
    name: Option<String>,
    #[schema(value_type = String, example = "2a1073fc-841d-4891-b453-9eb3aaabef3d")]
    project_id: Option<String>,
}

impl UpdateEntryRequest {
    fn validate(self) -> Result<EntryInput, AppError> {
        Ok(EntryInput {
            name: require_name("name", self.name.as_deref())?,
            project_id: require_uuid("projectId", self.project_id.as_deref())?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub img_url: String,
    #[schema(value_type = String)]
    pub user_id: Uuid,
    pub api_key: String,
    pub project: ProjectResponse,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<EntryDetail> for EntryResponse {
    fn from(detail: EntryDetail) -> Self {
        let EntryDetail { entry, project } = detail;
        EntryResponse {
            id: entry.id,
            name: entry.name,
            img_url: entry.img_url,
            user_id: entry.user_id,
            api_key: entry.api_key,
            project: project.into(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

pub(crate) fn to_responses(details: Vec<EntryDetail>) -> Vec<EntryResponse> {
    details.into_iter().map(EntryResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/entry",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Fields: name, projectId, file"),
    responses(
        (status = 201, description = "Entry created successfully", body = EntryResponse),
        (status = 400, description = "Validation failed or file missing"),
        (status = 404, description = "Project not found"),
        (status = 409, description = "Entry name already taken"),
        (status = 413, description = "Upload too large")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entry"
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponse>>), AppError> {
    let mut form = UploadForm::read(multipart?).await?;
    let input = EntryInput {
        name: require_name("name", form.text("name"))?,
        project_id: require_uuid("projectId", form.text("projectId"))?,
    };
    let file = form.take_file()?;

    let base_url = public_base_url(&headers, &uri, &state.config);
    let detail = persist_with_upload(&state.uploads, file, &base_url, |img_url| {
        state.entries.create(input, img_url, auth_user.id)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Entry created successfully", detail.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/entry",
    responses(
        (status = 200, description = "Entries owned by the caller", body = [EntryResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entry"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<EntryResponse>>>, AppError> {
    let entries = state.entries.find_all(auth_user.id).await?;

    Ok(Json(ApiResponse::new("Entries retrieved", to_responses(entries))))
}

#[utoipa::path(
    get,
    path = "/entry/project/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Caller's entries under the project", body = [EntryResponse]),
        (status = 400, description = "Malformed project ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entry"
)]
pub async fn list_project_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(project_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<EntryResponse>>>, AppError> {
    let entries = state.entries.find_by_project(auth_user.id, project_id).await?;

    Ok(Json(ApiResponse::new("Entries retrieved for project", to_responses(entries))))
}

#[utoipa::path(
    put,
    path = "/entry/{id}",
    params(
        ("id" = String, Path, description = "Entry ID")
    ),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Entry or project not found"),
        (status = 409, description = "Entry name already taken")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entry"
)]
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateEntryRequest>,
) -> Result<Json<ApiResponse<EntryResponse>>, AppError> {
    let input = payload.validate()?;
    let detail = state.entries.update(id, input, auth_user.id).await?;

    Ok(Json(ApiResponse::new("Entry updated", detail.into())))
}

#[utoipa::path(
    delete,
    path = "/entry/{id}",
    params(
        ("id" = String, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted successfully", body = MessageResponse),
        (status = 404, description = "Entry not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entry"
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.entries.remove(id, auth_user.id).await?;

    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}
