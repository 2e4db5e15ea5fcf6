//! Organization repository for async database operations.
//!
//! Covers the organizations table and the organization_users membership
//! table that drives project visibility.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{NewOrganization, Organization, OrganizationUser};

/// Organization repository holding an async connection pool.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: AsyncDbPool,
}

impl OrganizationRepository {
    /// Creates a new OrganizationRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Creates a new organization in the database.
    pub async fn create(&self, new_organization: NewOrganization) -> Result<Organization, AppError> {
        use crate::schema::organizations::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(organizations)
            .values(&new_organization)
            .returning(Organization::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Finds an organization by its ID.
    ///
    /// # Returns
    /// `Some(Organization)` if found, `None` otherwise
    pub async fn find_by_id(&self, org_id: Uuid) -> Result<Option<Organization>, AppError> {
        use crate::schema::organizations::dsl::*;
        let mut conn = self.pool.get().await?;

        organizations
            .filter(organization_id.eq(org_id))
            .select(Organization::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Checks whether an organization with the given ID exists.
    pub async fn exists(&self, org_id: Uuid) -> Result<bool, AppError> {
        use crate::schema::organizations::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::select(exists(organizations.filter(organization_id.eq(org_id))))
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Adds a user to an organization.
    ///
    /// Inserting an existing membership is a no-op.
    pub async fn add_member(&self, org_id: Uuid, member_id: i32) -> Result<(), AppError> {
        use crate::schema::organization_users::dsl::*;
        let mut conn = self.pool.get().await?;

        let membership = OrganizationUser {
            organization_id: org_id,
            user_id: member_id,
        };

        diesel::insert_into(organization_users)
            .values(&membership)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    /// Checks whether a user belongs to an organization.
    pub async fn is_member(&self, org_id: Uuid, member_id: i32) -> Result<bool, AppError> {
        use crate::schema::organization_users::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::select(exists(
            organization_users
                .filter(organization_id.eq(org_id))
                .filter(user_id.eq(member_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(AppError::from)
    }
}
