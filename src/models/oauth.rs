//! OAuth2 models for database operations.
//!
//! This module provides data models for registered client applications and
//! the opaque bearer tokens issued to users.

use chrono::{NaiveDateTime, Utc};
use diesel::AsExpression;
use diesel::FromSqlRow;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use serde::{Deserialize, Serialize};
use std::io::Write;

// ============================================================================
// Enums
// ============================================================================

/// OAuth2 client type, mapped to the `client_type` Postgres enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = crate::schema::sql_types::ClientType)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Confidential,
    Public,
}

impl ToSql<crate::schema::sql_types::ClientType, Pg> for ClientType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            ClientType::Confidential => "confidential",
            ClientType::Public => "public",
        };
        out.write_all(s.as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::ClientType, Pg> for ClientType {
    fn from_sql(
        bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
    ) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"confidential" => Ok(ClientType::Confidential),
            b"public" => Ok(ClientType::Public),
            other => Err(format!(
                "Unrecognized client_type: {}",
                String::from_utf8_lossy(other)
            )
            .into()),
        }
    }
}

/// OAuth2 authorization grant type, mapped to the `grant_type` Postgres enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = crate::schema::sql_types::GrantType)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    ClientCredentials,
    Password,
}

impl ToSql<crate::schema::sql_types::GrantType, Pg> for GrantType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::Password => "password",
        };
        out.write_all(s.as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::GrantType, Pg> for GrantType {
    fn from_sql(
        bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
    ) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"authorization_code" => Ok(GrantType::AuthorizationCode),
            b"client_credentials" => Ok(GrantType::ClientCredentials),
            b"password" => Ok(GrantType::Password),
            other => Err(format!(
                "Unrecognized grant_type: {}",
                String::from_utf8_lossy(other)
            )
            .into()),
        }
    }
}

// ============================================================================
// Application Models (Query/Insert)
// ============================================================================

/// Application query model for SELECT operations
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Application {
    pub id: i32,
    pub client_id: String,
    pub client_secret: String,
    pub name: String,
    pub user_id: Option<i32>,
    pub client_type: ClientType,
    pub authorization_grant_type: GrantType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// NewApplication insert model for INSERT operations
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::applications)]
pub struct NewApplication {
    pub client_id: String,
    pub client_secret: String,
    pub name: String,
    pub user_id: Option<i32>,
    pub client_type: ClientType,
    pub authorization_grant_type: GrantType,
}

// ============================================================================
// AccessToken Models (Query/Insert)
// ============================================================================

/// AccessToken query model for SELECT operations
///
/// Tokens are opaque random strings; everything the server needs to know
/// about one (owner, expiry, scope) lives in this row.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::access_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccessToken {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub application_id: Option<i32>,
    pub expires: NaiveDateTime,
    pub scope: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AccessToken {
    /// Returns true when the token's expiry timestamp has passed
    pub fn is_expired(&self) -> bool {
        self.expires <= Utc::now().naive_utc()
    }

    /// Returns true when the token can still authenticate requests
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// Iterates over the space-separated scope entries
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    /// Returns true when the token grants the named scope
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().any(|s| s == scope)
    }
}

/// NewAccessToken insert model for INSERT operations
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::access_tokens)]
pub struct NewAccessToken {
    pub token: String,
    pub user_id: i32,
    pub application_id: Option<i32>,
    pub expires: NaiveDateTime,
    pub scope: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn token_with(expires: NaiveDateTime, scope: &str) -> AccessToken {
        let now = Utc::now().naive_utc();
        AccessToken {
            id: 1,
            token: "sRNWtJLWyLIDiPCEmCMrKssWLGLDkw".to_string(),
            user_id: 1,
            application_id: Some(1),
            expires,
            scope: scope.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_in_the_future_is_valid() {
        let token = token_with(Utc::now().naive_utc() + Duration::hours(10), "read write");
        assert!(token.is_valid());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_in_the_past_is_expired() {
        let token = token_with(Utc::now().naive_utc() - Duration::hours(1), "read write");
        assert!(token.is_expired());
        assert!(!token.is_valid());
    }

    #[test]
    fn test_has_scope_matches_whole_entries_only() {
        let token = token_with(
            Utc::now().naive_utc() + Duration::hours(1),
            "read write dolphin",
        );
        assert!(token.has_scope("read"));
        assert!(token.has_scope("write"));
        assert!(token.has_scope("dolphin"));
        assert!(!token.has_scope("rea"));
        assert!(!token.has_scope("admin"));
    }

    #[test]
    fn test_empty_scope_grants_nothing() {
        let token = token_with(Utc::now().naive_utc() + Duration::hours(1), "");
        assert!(!token.has_scope("read"));
        assert_eq!(token.scopes().count(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every entry of a space-joined scope string is granted, regardless
        /// of how much whitespace separates the entries.
        #[test]
        fn prop_all_joined_scopes_are_granted(
            entries in proptest::collection::vec("[a-z]{1,12}", 0..8),
            separator in prop_oneof![Just(" "), Just("  "), Just("\t")],
        ) {
            let token = token_with(
                Utc::now().naive_utc() + Duration::hours(1),
                &entries.join(separator),
            );
            for entry in &entries {
                prop_assert!(token.has_scope(entry));
            }
            prop_assert_eq!(token.scopes().count(), entries.len());
        }
    }
}
