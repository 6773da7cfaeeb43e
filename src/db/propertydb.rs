use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::{query_timeout::QueryTimeout, DBClient},
    models::propertymodel::{PriceStats, Property, PropertyWithSeller},
    service::property_filter::PropertyFilter,
};

const PROPERTY_WITH_SELLER_SELECT: &str = r#"
    SELECT
        p.id, p.seller_id, p.title, p.description, p.price, p.location, p.area_size,
        p.property_type, p.approval, p.status, p.is_verified, p.images, p.view_count,
        p.key_attributes, p.advertise_on_social_media, p.created_at, p.updated_at,
        u.name AS seller_name, u.email AS seller_email
    FROM properties p
    LEFT JOIN users u ON u.id = p.seller_id
"#;

#[async_trait]
pub trait PropertyExt: Send + Sync {
    async fn count_properties(
        &self,
        filter: &PropertyFilter,
    ) -> Result<i64, sqlx::Error>;

    /// Newest first, ties broken by id so pages never overlap.
    async fn find_properties(
        &self,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PropertyWithSeller>, sqlx::Error>;

    async fn get_property_by_id(
        &self,
        property_id: Uuid,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn get_price_stats(&self) -> Result<PriceStats, sqlx::Error>;

    /// Distinct, trimmed, non-empty cities of structured locations, sorted.
    async fn get_distinct_cities(&self) -> Result<Vec<String>, sqlx::Error>;

    /// Adds one to `view_count` and returns the new value, or `None` when
    /// the property does not exist.
    async fn increment_view_count(
        &self,
        property_id: Uuid,
    ) -> Result<Option<i64>, sqlx::Error>;

    /// Raises `view_count` to at least `floor`; never lowers it.
    async fn raise_view_count(
        &self,
        property_id: Uuid,
        floor: i64,
    ) -> Result<Option<i64>, sqlx::Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn count_properties(
        &self,
        filter: &PropertyFilter,
    ) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties p");
        filter.push_where(&mut qb);

        QueryTimeout::run(
            qb.build_query_scalar::<i64>().fetch_one(&self.pool),
            QueryTimeout::DEFAULT_TIMEOUT,
        )
        .await
    }

    async fn find_properties(
        &self,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PropertyWithSeller>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(PROPERTY_WITH_SELLER_SELECT);
        filter.push_where(&mut qb);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        QueryTimeout::run(
            qb.build_query_as::<PropertyWithSeller>().fetch_all(&self.pool),
            QueryTimeout::DEFAULT_TIMEOUT,
        )
        .await
    }

    async fn get_property_by_id(
        &self,
        property_id: Uuid,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = sqlx::query_as::<_, Property>(
            r#"
            SELECT
                id, seller_id, title, description, price, location, area_size,
                property_type, approval, status, is_verified, images, view_count,
                key_attributes, advertise_on_social_media, created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool);

        QueryTimeout::run(query, QueryTimeout::LOOKUP_TIMEOUT).await
    }

    async fn get_price_stats(&self) -> Result<PriceStats, sqlx::Error> {
        let query = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COALESCE(MIN(price), 0)::BIGINT AS min_price,
                COALESCE(MAX(price), 0)::BIGINT AS max_price
            FROM properties
            "#,
        )
        .fetch_one(&self.pool);

        let (min_price, max_price) = QueryTimeout::run(query, QueryTimeout::AGGREGATION_TIMEOUT).await?;

        Ok(PriceStats { min_price, max_price })
    }

    async fn get_distinct_cities(&self) -> Result<Vec<String>, sqlx::Error> {
        let query = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT BTRIM(location->>'city') AS city
            FROM properties
            WHERE location->>'kind' = 'structured'
            AND NULLIF(BTRIM(location->>'city'), '') IS NOT NULL
            ORDER BY city
            "#,
        )
        .fetch_all(&self.pool);

        QueryTimeout::run(query, QueryTimeout::AGGREGATION_TIMEOUT).await
    }

    async fn increment_view_count(
        &self,
        property_id: Uuid,
    ) -> Result<Option<i64>, sqlx::Error> {
        let query = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE properties
            SET view_count = view_count + 1
            WHERE id = $1
            RETURNING view_count
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool);

        QueryTimeout::run(query, QueryTimeout::DEFAULT_TIMEOUT).await
    }

    async fn raise_view_count(
        &self,
        property_id: Uuid,
        floor: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let query = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE properties
            SET view_count = GREATEST(view_count, $2)
            WHERE id = $1
            RETURNING view_count
            "#,
        )
        .bind(property_id)
        .bind(floor)
        .fetch_optional(&self.pool);

        QueryTimeout::run(query, QueryTimeout::DEFAULT_TIMEOUT).await
    }
}
