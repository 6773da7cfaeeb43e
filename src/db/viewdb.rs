use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{query_timeout::QueryTimeout, DBClient},
    models::viewmodel::{InsertOutcome, PropertyView, ViewStats},
};

#[async_trait]
pub trait PropertyViewExt: Send + Sync {
    async fn find_view(
        &self,
        property_id: Uuid,
        viewer_key: &str,
        view_day: NaiveDate,
    ) -> Result<Option<PropertyView>, sqlx::Error>;

    /// Appends to the log unless (property, viewer key, day) is already
    /// present. The uniqueness check and the insert are one atomic step.
    async fn insert_view(
        &self,
        view: &PropertyView,
    ) -> Result<InsertOutcome, sqlx::Error>;

    async fn get_view_stats(
        &self,
        property_id: Uuid,
        recent_since: DateTime<Utc>,
    ) -> Result<ViewStats, sqlx::Error>;

    /// Number of distinct (viewer, day) pairs logged for the property.
    async fn count_distinct_views(
        &self,
        property_id: Uuid,
    ) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl PropertyViewExt for DBClient {
    async fn find_view(
        &self,
        property_id: Uuid,
        viewer_key: &str,
        view_day: NaiveDate,
    ) -> Result<Option<PropertyView>, sqlx::Error> {
        let query = sqlx::query_as::<_, PropertyView>(
            r#"
            SELECT id, property_id, user_id, ip_address, viewer_key, view_day, viewed_at
            FROM property_views
            WHERE property_id = $1 AND viewer_key = $2 AND view_day = $3
            LIMIT 1
            "#,
        )
        .bind(property_id)
        .bind(viewer_key)
        .bind(view_day)
        .fetch_optional(&self.pool);

        QueryTimeout::run(query, QueryTimeout::LOOKUP_TIMEOUT).await
    }

    async fn insert_view(
        &self,
        view: &PropertyView,
    ) -> Result<InsertOutcome, sqlx::Error> {
        let query = sqlx::query(
            r#"
            INSERT INTO property_views (id, property_id, user_id, ip_address, viewer_key, view_day, viewed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (property_id, viewer_key, view_day) DO NOTHING
            "#,
        )
        .bind(view.id)
        .bind(view.property_id)
        .bind(view.user_id)
        .bind(&view.ip_address)
        .bind(&view.viewer_key)
        .bind(view.view_day)
        .bind(view.viewed_at)
        .execute(&self.pool);

        let result = QueryTimeout::run(query, QueryTimeout::DEFAULT_TIMEOUT).await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn get_view_stats(
        &self,
        property_id: Uuid,
        recent_since: DateTime<Utc>,
    ) -> Result<ViewStats, sqlx::Error> {
        let query = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*) AS total_views,
                COUNT(DISTINCT user_id) AS unique_users,
                COUNT(*) FILTER (WHERE viewed_at >= $2) AS last_7_days_views
            FROM property_views
            WHERE property_id = $1
            "#,
        )
        .bind(property_id)
        .bind(recent_since)
        .fetch_one(&self.pool);

        let (total_views, unique_users, last_7_days_views) =
            QueryTimeout::run(query, QueryTimeout::AGGREGATION_TIMEOUT).await?;

        Ok(ViewStats {
            total_views,
            unique_users,
            last_7_days_views,
        })
    }

    async fn count_distinct_views(
        &self,
        property_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let query = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT (viewer_key, view_day))
            FROM property_views
            WHERE property_id = $1
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool);

        QueryTimeout::run(query, QueryTimeout::AGGREGATION_TIMEOUT).await
    }
}
