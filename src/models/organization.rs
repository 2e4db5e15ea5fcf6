use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

/// Organization row as stored.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Organization {
    pub organization_id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable organization.
#[derive(Debug, Insertable, Deserialize, Clone)]
#[diesel(table_name = crate::schema::organizations)]
pub struct NewOrganization {
    pub name: String,
}

/// Membership row linking a user to an organization
#[derive(Debug, Queryable, Selectable, Insertable, Clone)]
#[diesel(table_name = crate::schema::organization_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrganizationUser {
    pub organization_id: Uuid,
    pub user_id: i32,
}
