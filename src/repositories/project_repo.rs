//! Project repository for async database operations.
//!
//! Visibility is organization-scoped: a project can be read, updated or
//! deleted only by users belonging to its organization. The scoped queries
//! here express that with an `IN` subselect on organization_users, so a
//! non-member sees the same result as a missing row.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{NewProject, Project, ProjectMember, UpdateProject};
use crate::schema::{organization_users, project_members, projects};

/// Project repository holding an async connection pool.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: AsyncDbPool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Creates a new project in the database.
    pub async fn create(&self, new_project: NewProject) -> Result<Project, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(projects::table)
            .values(&new_project)
            .returning(Project::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Lists all projects visible to a user, oldest first.
    ///
    /// A project is visible when the user belongs to its organization.
    pub async fn list_for_user(&self, viewer_id: i32) -> Result<Vec<Project>, AppError> {
        let mut conn = self.pool.get().await?;

        let member_orgs = organization_users::table
            .filter(organization_users::user_id.eq(viewer_id))
            .select(organization_users::organization_id);

        projects::table
            .filter(projects::organization_id.eq_any(member_orgs))
            .order(projects::created_at.asc())
            .select(Project::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Finds a project by ID, restricted to what the user may see.
    ///
    /// # Returns
    /// `Some(Project)` if the project exists and the user belongs to its
    /// organization, `None` otherwise
    pub async fn find_visible(
        &self,
        id: Uuid,
        viewer_id: i32,
    ) -> Result<Option<Project>, AppError> {
        let mut conn = self.pool.get().await?;

        let member_orgs = organization_users::table
            .filter(organization_users::user_id.eq(viewer_id))
            .select(organization_users::organization_id);

        projects::table
            .find(id)
            .filter(projects::organization_id.eq_any(member_orgs))
            .select(Project::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Applies a changeset to a project by primary key.
    ///
    /// Callers are expected to have checked visibility first; the row is
    /// updated regardless of organization membership.
    ///
    /// # Returns
    /// `Some(Project)` with the new field values, `None` if the row is gone
    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateProject,
    ) -> Result<Option<Project>, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(projects::table.find(id))
            .set(&changes)
            .returning(Project::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Deletes a project if it is visible to the user.
    ///
    /// # Returns
    /// The number of deleted rows (0 when the project does not exist or the
    /// user is not in its organization)
    pub async fn delete_visible(&self, id: Uuid, viewer_id: i32) -> Result<usize, AppError> {
        let mut conn = self.pool.get().await?;

        let member_orgs = organization_users::table
            .filter(organization_users::user_id.eq(viewer_id))
            .select(organization_users::organization_id);

        diesel::delete(
            projects::table
                .find(id)
                .filter(projects::organization_id.eq_any(member_orgs)),
        )
        .execute(&mut conn)
        .await
        .map_err(AppError::from)
    }

    /// Adds a user to a project's member list.
    ///
    /// Membership rows do not influence API visibility, which is decided by
    /// organization membership alone. Inserting an existing row is a no-op.
    pub async fn add_member(&self, id: Uuid, member_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        let membership = ProjectMember {
            project_id: id,
            user_id: member_id,
        };

        diesel::insert_into(project_members::table)
            .values(&membership)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
