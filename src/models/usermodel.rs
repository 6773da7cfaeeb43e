use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Seller,
    User,
}

impl UserRole {
    /// Parses the loosely typed `role` query parameter.
    pub fn from_param(value: &str) -> Option<UserRole> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "seller" => Some(UserRole::Seller),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }
}

/// Read-only view of an account. Registration and profile updates live
/// outside this service.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
