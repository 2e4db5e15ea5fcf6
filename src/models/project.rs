use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

/// Project row as stored.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    pub project_id: Uuid,
    pub name: String,
    pub script: Option<String>,
    pub organization_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable project.
#[derive(Debug, Insertable, Deserialize, Clone)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject {
    pub name: String,
    pub script: Option<String>,
    pub organization_id: Uuid,
}

/// Changeset for partial updates.
///
/// A `None` field is left untouched by the generated UPDATE statement, which
/// is what both PUT (script omitted) and PATCH rely on.
#[derive(Debug, AsChangeset, Deserialize, Clone, Default)]
#[diesel(table_name = crate::schema::projects)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub script: Option<String>,
    pub organization_id: Option<Uuid>,
}

impl UpdateProject {
    /// Whether any field is set.
    ///
    /// Diesel rejects UPDATE statements with an empty changeset, so callers
    /// skip the query entirely for a body like `{}`.
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.script.is_some() || self.organization_id.is_some()
    }
}

/// Membership row linking a user to a project
#[derive(Debug, Queryable, Selectable, Insertable, Clone)]
#[diesel(table_name = crate::schema::project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: i32,
}
