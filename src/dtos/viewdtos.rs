use serde::{Deserialize, Serialize};

use crate::models::viewmodel::ViewStats;

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordViewResponseDto {
    pub success: bool,
    pub message: String,
    #[serde(rename = "alreadyViewed")]
    pub already_viewed: bool,
    #[serde(rename = "viewCount", skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewAnalyticsDto {
    #[serde(rename = "totalViews")]
    pub total_views: i64,
    #[serde(rename = "uniqueUsers")]
    pub unique_users: i64,
    #[serde(rename = "last7DaysViews")]
    pub last_7_days_views: i64,
}

impl From<ViewStats> for ViewAnalyticsDto {
    fn from(stats: ViewStats) -> Self {
        ViewAnalyticsDto {
            total_views: stats.total_views,
            unique_users: stats.unique_users,
            last_7_days_views: stats.last_7_days_views,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReconcileResponseDto {
    pub success: bool,
    pub view_count: i64,
}
