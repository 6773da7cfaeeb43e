use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Who looked at a property. An authenticated user always wins over the
/// client address; the two never combine into one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewerIdentity {
    User(Uuid),
    Ip(String),
}

impl ViewerIdentity {
    pub fn resolve(user_id: Option<Uuid>, ip_address: Option<String>) -> Option<ViewerIdentity> {
        match (user_id, ip_address) {
            (Some(id), _) => Some(ViewerIdentity::User(id)),
            (None, Some(ip)) if !ip.trim().is_empty() => Some(ViewerIdentity::Ip(ip.trim().to_string())),
            _ => None,
        }
    }

    /// Stable dedup key stored in `property_views.viewer_key`.
    pub fn key(&self) -> String {
        match self {
            ViewerIdentity::User(id) => format!("user:{}", id),
            ViewerIdentity::Ip(ip) => format!("ip:{}", ip),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            ViewerIdentity::User(id) => Some(*id),
            ViewerIdentity::Ip(_) => None,
        }
    }

    pub fn ip_address(&self) -> Option<&str> {
        match self {
            ViewerIdentity::Ip(ip) => Some(ip),
            ViewerIdentity::User(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PropertyView {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub viewer_key: String,
    pub view_day: NaiveDate,
    pub viewed_at: DateTime<Utc>,
}

impl PropertyView {
    pub fn new(property_id: Uuid, viewer: &ViewerIdentity, view_day: NaiveDate, viewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            user_id: viewer.user_id(),
            ip_address: viewer.ip_address().map(str::to_string),
            viewer_key: viewer.key(),
            view_day,
            viewed_at,
        }
    }
}

/// Result of appending to the view log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewStats {
    pub total_views: i64,
    pub unique_users: i64,
    pub last_7_days_views: i64,
}
