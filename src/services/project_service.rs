//! Project service for business logic operations.
//!
//! Owns the visibility and permission rules around projects:
//!
//! - a project can be read, updated or deleted only by members of its
//!   organization, and an out-of-scope id behaves exactly like a missing
//!   one (404, so existence is not revealed);
//! - creating a project, or moving one to another organization, requires
//!   membership in the target organization (403 otherwise);
//! - a target organization that does not exist at all is a validation
//!   failure, reported before any permission check.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewProject, Project, UpdateProject};
use crate::repositories::{OrganizationRepository, ProjectRepository};

/// Project service for handling project-related business logic.
#[derive(Clone)]
pub struct ProjectService {
    projects: ProjectRepository,
    organizations: OrganizationRepository,
}

impl ProjectService {
    /// Creates a new ProjectService with the given repositories.
    pub fn new(projects: ProjectRepository, organizations: OrganizationRepository) -> Self {
        Self {
            projects,
            organizations,
        }
    }

    /// Lists the projects visible to the calling user.
    ///
    /// A caller belonging to no organization gets an empty list, not an
    /// error.
    pub async fn list_projects(&self, viewer_id: i32) -> AppResult<Vec<Project>> {
        self.projects.list_for_user(viewer_id).await
    }

    /// Gets a single visible project.
    ///
    /// # Returns
    /// The project, or `NotFound` when it does not exist or the caller is
    /// outside its organization
    pub async fn get_project(&self, id: Uuid, viewer_id: i32) -> AppResult<Project> {
        self.projects
            .find_visible(id, viewer_id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Creates a project in an organization the caller belongs to.
    pub async fn create_project(
        &self,
        new_project: NewProject,
        creator_id: i32,
    ) -> AppResult<Project> {
        self.check_membership(new_project.organization_id, creator_id)
            .await?;
        self.projects.create(new_project).await
    }

    /// Updates a visible project with the given changeset.
    ///
    /// Serves both full and partial updates; fields left `None` keep their
    /// stored value. Changing `organization_id` requires membership in the
    /// target organization.
    pub async fn update_project(
        &self,
        id: Uuid,
        changes: UpdateProject,
        viewer_id: i32,
    ) -> AppResult<Project> {
        let current = self.get_project(id, viewer_id).await?;

        if let Some(target) = changes.organization_id {
            if target != current.organization_id {
                self.check_membership(target, viewer_id).await?;
            }
        }

        if !changes.has_changes() {
            return Ok(current);
        }

        self.projects
            .update(id, changes)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Deletes a visible project.
    ///
    /// # Returns
    /// `Ok(())` on deletion, `NotFound` when the project does not exist or
    /// the caller is outside its organization
    pub async fn delete_project(&self, id: Uuid, viewer_id: i32) -> AppResult<()> {
        let deleted = self.projects.delete_visible(id, viewer_id).await?;
        if deleted == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    /// Rejects organizations the user may not create projects in.
    ///
    /// An unknown organization is a validation failure, checked before
    /// membership so the two cases stay distinguishable.
    async fn check_membership(&self, org_id: Uuid, viewer_id: i32) -> AppResult<()> {
        if !self.organizations.exists(org_id).await? {
            return Err(AppError::Validation {
                field: "organization_id".to_string(),
                reason: format!("Unknown organization '{org_id}'"),
            });
        }
        if !self.organizations.is_member(org_id, viewer_id).await? {
            return Err(AppError::Forbidden {
                message: "Not a member of the requested organization".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound {
            entity: "project".to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }
}
