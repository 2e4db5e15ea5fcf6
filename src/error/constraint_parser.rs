use regex::Regex;
use std::sync::OnceLock;

/// Turns PostgreSQL constraint violation text into (entity, field, value)
/// triples that the API can report back to callers.
///
/// Postgres encodes the interesting parts in two places: the constraint
/// name (`users_username_key`) and the DETAIL line (`Key (username)=(alice)
/// already exists`). Both are tried, name first.
pub struct ConstraintParser;

/// Tables of this schema, checked longest-first so that multi-word names
/// like `organization_users` win over their `organizations` prefix.
const KNOWN_TABLES: &[&str] = &[
    "organization_users",
    "project_members",
    "access_tokens",
    "organizations",
    "applications",
    "projects",
    "users",
];

/// Regexes over the server's error text, compiled once per process.
struct MessagePatterns {
    /// `Key (field)=(value)` from a DETAIL line
    key_value: Regex,
    /// `column "name"`
    column: Regex,
    /// `table "name"`
    table: Regex,
}

impl MessagePatterns {
    fn new() -> Self {
        Self {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").unwrap(),
            column: Regex::new(r#"column "([^"]+)""#).unwrap(),
            table: Regex::new(r#"table "([^"]+)""#).unwrap(),
        }
    }
}

static MESSAGE_PATTERNS: OnceLock<MessagePatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static MessagePatterns {
        MESSAGE_PATTERNS.get_or_init(MessagePatterns::new)
    }

    /// Parses a unique violation into (entity, field, value).
    ///
    /// The constraint name (`users_username_key`) gives entity and field;
    /// the offending value comes from the DETAIL line. Without a usable
    /// constraint name the DETAIL line alone still yields field and value,
    /// with the entity taken from the message or defaulted.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = Self::extract_value_from_message(message)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = Self::extract_key_value_from_message(message)?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a not-null violation into (entity, field).
    ///
    /// The column always comes from the message; the entity is taken from
    /// the message, then the constraint name, then defaulted.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column_from_message(message)?;
        let entity = Self::extract_table_from_message(message)
            .or_else(|| constraint_name.and_then(|c| Self::parse_constraint_name(c).map(|(e, _)| e)))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Parses a foreign key violation into (entity, field, referenced value).
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        if let Some((entity, field)) =
            constraint_name.and_then(Self::parse_foreign_key_constraint_name)
        {
            let value = Self::extract_value_from_message(message)
                .unwrap_or_else(|| "invalid_reference".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = Self::extract_key_value_from_message(message)?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Splits a constraint name like `users_username_key` or
    /// `access_tokens_token_key` into (entity, field).
    ///
    /// The table part is matched against the schema's table list so that
    /// underscored table names split correctly; names with an unknown
    /// prefix fall back to splitting on the first underscore.
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stripped = Self::strip_constraint_suffix(constraint_name)?;

        Self::split_on_known_table(stripped).or_else(|| {
            let (entity, field) = stripped.split_once('_')?;
            Some((entity.to_string(), field.to_string()))
        })
    }

    /// Splits a foreign key constraint name like
    /// `projects_organization_id_fkey` into (entity, field).
    pub fn parse_foreign_key_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let without_suffix = constraint_name.strip_suffix("_fkey")?;

        Self::split_on_known_table(without_suffix).or_else(|| {
            // field may itself contain underscores, e.g. "user_id"
            let (entity, field) = without_suffix.split_once('_')?;
            Some((entity.to_string(), field.to_string()))
        })
    }

    /// Removes the trailing constraint kind marker (_key, _pkey, _idx, _check)
    fn strip_constraint_suffix(constraint_name: &str) -> Option<&str> {
        ["_pkey", "_key", "_fkey", "_idx", "_check"]
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))
    }

    /// Splits "<table>_<field>" on the longest known table name prefix
    fn split_on_known_table(name: &str) -> Option<(String, String)> {
        KNOWN_TABLES.iter().find_map(|table| {
            let field = name.strip_prefix(table)?.strip_prefix('_')?;
            if field.is_empty() {
                None
            } else {
                Some((table.to_string(), field.to_string()))
            }
        })
    }

    fn capture_first(pattern: &Regex, message: &str) -> Option<String> {
        pattern
            .captures(message)?
            .get(1)
            .map(|m| m.as_str().to_string())
    }

    /// The column named in the message, from `column "..."`.
    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::capture_first(&Self::patterns().column, message)
    }

    /// The table named in the message, from `table "..."`.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::capture_first(&Self::patterns().table, message)
    }

    /// The (field, value) pair from a `Key (field)=(value)` DETAIL line.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        let caps = Self::patterns().key_value.captures(message)?;
        let field = caps.get(1)?.as_str().to_string();
        let value = caps.get(2)?.as_str().to_string();
        Some((field, value))
    }

    /// The offending value, from the DETAIL line when present, otherwise
    /// the first double-quoted token in the message.
    pub fn extract_value_from_message(message: &str) -> Option<String> {
        if let Some((_, value)) = Self::extract_key_value_from_message(message) {
            return Some(value);
        }

        let start = message.find('"')?;
        let end = message[start + 1..].find('"')?;
        Some(message[start + 1..start + 1 + end].to_string())
    }
}
