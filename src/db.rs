pub mod cache;
pub mod lookupdb;
pub mod memory;
pub mod propertydb;
pub mod query_timeout;
pub mod userdb;
pub mod viewdb;

use sqlx::{Pool, Postgres};

use self::{lookupdb::LookupExt, propertydb::PropertyExt, userdb::UserExt, viewdb::PropertyViewExt};

#[derive(Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl std::fmt::Debug for DBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBClient")
            .field("pool", &"Pool<Postgres>")
            .field("size", &self.pool.size())
            .finish()
    }
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// Everything the search and view services need from persistence.
/// Implemented by the Postgres `DBClient` and the in-process `MemoryStore`.
pub trait Store: PropertyExt + PropertyViewExt + LookupExt + UserExt + std::fmt::Debug {
    fn backend_name(&self) -> &'static str;
}

impl Store for DBClient {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
