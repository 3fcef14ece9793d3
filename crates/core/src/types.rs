/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Owner recorded on rows created without an explicit user.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Return `user_id` or [`ANONYMOUS_USER`] when it is missing or blank.
pub fn user_or_anonymous(user_id: Option<&str>) -> String {
    match user_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ANONYMOUS_USER.to_string(),
    }
}
