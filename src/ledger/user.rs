use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A chat participant, identified by the externally assigned numeric id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub created_at: NaiveDateTime,
}
