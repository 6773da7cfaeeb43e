use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::{query_timeout::QueryTimeout, DBClient},
    models::{
        propertymodel::{ReferenceKind, ReferenceType},
        usermodel::UserRole,
    },
};

#[async_trait]
pub trait LookupExt: Send + Sync {
    /// All rows of a lookup table, active or not, ordered by name.
    async fn get_reference_types(
        &self,
        kind: ReferenceKind,
    ) -> Result<Vec<ReferenceType>, sqlx::Error>;

    async fn get_user_ids_by_role(
        &self,
        role: UserRole,
    ) -> Result<Vec<Uuid>, sqlx::Error>;
}

#[async_trait]
impl LookupExt for DBClient {
    async fn get_reference_types(
        &self,
        kind: ReferenceKind,
    ) -> Result<Vec<ReferenceType>, sqlx::Error> {
        let sql = format!(
            "SELECT id, name, status, visible_to_seller FROM {} ORDER BY name",
            kind.table()
        );
        let query = sqlx::query_as::<_, ReferenceType>(&sql).fetch_all(&self.pool);

        QueryTimeout::run(query, QueryTimeout::LOOKUP_TIMEOUT).await
    }

    async fn get_user_ids_by_role(
        &self,
        role: UserRole,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let query = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role = $1")
            .bind(role)
            .fetch_all(&self.pool);

        QueryTimeout::run(query, QueryTimeout::DEFAULT_TIMEOUT).await
    }
}
