//! Project request handlers.
//!
//! All endpoints operate on the projects visible to the authenticated user,
//! which are the projects of the organizations the user belongs to.

use crate::api::doc::PROJECT_TAG;
use crate::api::dto::{
    CreateProjectRequest, PatchProjectRequest, ProjectResponse, UpdateProjectRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

/// Creates project-related routes.
pub fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_projects))
        .routes(routes!(create_project))
        .routes(routes!(get_project))
        .routes(routes!(update_project))
        .routes(routes!(patch_project))
        .routes(routes!(delete_project))
}

/// GET /api/projects - List projects visible to the authenticated user
#[utoipa::path(
    get,
    path = "/",
    tag = PROJECT_TAG,
    responses(
        (status = 200, description = "Projects in the user's organizations", body = Vec<ProjectResponse>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_projects(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ProjectResponse>>> {
    let projects = state.services.projects.list_projects(auth_user.user_id).await?;
    let responses: Vec<ProjectResponse> =
        projects.into_iter().map(ProjectResponse::from).collect();
    Ok(Json(responses))
}

/// POST /api/projects - Create a new project
#[utoipa::path(
    post,
    path = "/",
    tag = PROJECT_TAG,
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = ProjectResponse),
        (status = 400, description = "Invalid request or unknown organization"),
        (status = 403, description = "Not a member of the requested organization")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    let new_project = req.into_new_project();
    let project = state
        .services
        .projects
        .create_project(new_project, auth_user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// GET /api/projects/:id - Get project by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PROJECT_TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = ProjectResponse),
        (status = 404, description = "Project not found or not visible")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProjectResponse>> {
    let project = state
        .services
        .projects
        .get_project(id, auth_user.user_id)
        .await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// PUT /api/projects/:id - Replace project by ID
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PROJECT_TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectResponse),
        (status = 403, description = "Not a member of the target organization"),
        (status = 404, description = "Project not found or not visible")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let changes = req.into_changes();
    let project = state
        .services
        .projects
        .update_project(id, changes, auth_user.user_id)
        .await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// PATCH /api/projects/:id - Partially update project by ID
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = PROJECT_TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = PatchProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectResponse),
        (status = 403, description = "Not a member of the target organization"),
        (status = 404, description = "Project not found or not visible")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn patch_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<PatchProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let changes = req.into_changes();
    let project = state
        .services
        .projects
        .update_project(id, changes, auth_user.user_id)
        .await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// DELETE /api/projects/:id - Delete project by ID
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PROJECT_TAG,
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted successfully"),
        (status = 404, description = "Project not found or not visible")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .projects
        .delete_project(id, auth_user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
