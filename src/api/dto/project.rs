//! Project-related DTOs for API requests and responses.

use crate::models::{NewProject, Project, UpdateProject};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a new project.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(min_length = 1, max_length = 200)]
    pub name: String,
    /// Organization the project belongs to. The caller must be a member.
    pub organization_id: Uuid,
    pub script: Option<String>,
}

impl CreateProjectRequest {
    /// Converts the request DTO into a NewProject model for database insertion.
    pub fn into_new_project(self) -> NewProject {
        NewProject {
            name: self.name,
            script: self.script,
            organization_id: self.organization_id,
        }
    }
}

/// Request body for replacing a project (PUT).
///
/// `script` may be omitted, in which case the stored value is kept. Clearing
/// it requires sending an empty string.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(min_length = 1, max_length = 200)]
    pub name: String,
    pub organization_id: Uuid,
    pub script: Option<String>,
}

impl UpdateProjectRequest {
    /// Converts the request DTO into an UpdateProject changeset.
    pub fn into_changes(self) -> UpdateProject {
        UpdateProject {
            name: Some(self.name),
            script: self.script,
            organization_id: Some(self.organization_id),
        }
    }
}

/// Request body for partially updating a project (PATCH).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PatchProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    pub organization_id: Option<Uuid>,
    pub script: Option<String>,
}

impl PatchProjectRequest {
    /// Converts the request DTO into an UpdateProject changeset.
    pub fn into_changes(self) -> UpdateProject {
        UpdateProject {
            name: self.name,
            script: self.script,
            organization_id: self.organization_id,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for project data.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub project_id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
    /// Always present, `null` when the project has no script.
    pub script: Option<String>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            project_id: project.project_id,
            name: project.name,
            organization_id: project.organization_id,
            script: project.script,
        }
    }
}
