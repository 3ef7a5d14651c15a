use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::project;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, MessageResponse};
use crate::services::projects::{NewProject, ProjectChanges};
use crate::state::AppState;
use crate::validation::{check_description, require_name};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "My Project")]
    name: Option<String>,
    #[schema(example = "Logos and banners")]
    description: Option<String>,
}

impl CreateProjectRequest {
    fn validate(self) -> Result<NewProject, AppError> {
        let name = require_name("name", self.name.as_deref())?;
        let description = self
            .description
            .ok_or_else(|| AppError::Validation("description is required".to_string()))?;
        check_description(&description)?;
        Ok(NewProject { name, description })
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    name: Option<String>,
    description: Option<String>,
}

impl UpdateProjectRequest {
    fn validate(self) -> Result<ProjectChanges, AppError> {
        let name = match self.name {
            Some(name) => Some(require_name("name", Some(&name))?),
            None => None,
        };
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(ProjectChanges {
            name,
            description: self.description,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub user_id: Uuid,
    pub api_key: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<project::Model> for ProjectResponse {
    fn from(project: project::Model) -> Self {
        ProjectResponse {
            id: project.id,
            name: project.name,
            description: project.description,
            slug: project.slug,
            user_id: project.user_id,
            api_key: project.api_key,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/project",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = ProjectResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Slug already taken")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectResponse>>), AppError> {
    let input = payload.validate()?;
    let project = state.projects.create(input, auth_user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Project created successfully", project.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/project",
    responses(
        (status = 200, description = "Projects owned by the caller", body = [ProjectResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ProjectResponse>>>, AppError> {
    let projects = state.projects.find_all(auth_user.id).await?;
    let data = projects.into_iter().map(ProjectResponse::from).collect();

    Ok(Json(ApiResponse::new("Projects retrieved successfully", data)))
}

#[utoipa::path(
    get,
    path = "/project/{slug}",
    params(
        ("slug" = String, Path, description = "Project slug")
    ),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(slug): AppPath<String>,
) -> Result<Json<ApiResponse<ProjectResponse>>, AppError> {
    let project = state.projects.find_one(&slug, auth_user.id).await?;

    Ok(Json(ApiResponse::new("Project retrieved successfully", project.into())))
}

#[utoipa::path(
    patch,
    path = "/project/{slug}",
    params(
        ("slug" = String, Path, description = "Project slug")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(slug): AppPath<String>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectResponse>>, AppError> {
    let changes = payload.validate()?;
    let project = state.projects.update(&slug, auth_user.id, changes).await?;

    Ok(Json(ApiResponse::new("Project updated successfully", project.into())))
}

#[utoipa::path(
    delete,
    path = "/project/{slug}",
    params(
        ("slug" = String, Path, description = "Project slug")
    ),
    responses(
        (status = 200, description = "Project and its entries removed", body = MessageResponse),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(slug): AppPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.projects.remove(&slug, auth_user.id).await?;

    Ok(Json(MessageResponse::new("Project removed successfully")))
}
