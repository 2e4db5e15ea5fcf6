use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;

/// Account row as stored.
///
/// The `password` column holds an argon2 PHC string; `User` carries no
/// Serialize derive and is never written into a response body.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable account. Callers hash the password before constructing
/// this; the repository stores the fields as given.
#[derive(Debug, Insertable, Deserialize, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}
