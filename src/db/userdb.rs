use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::{query_timeout::QueryTimeout, DBClient},
    models::usermodel::User,
};

#[async_trait]
pub trait UserExt: Send + Sync {
    async fn get_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool);

        QueryTimeout::run(query, QueryTimeout::LOOKUP_TIMEOUT).await
    }
}
