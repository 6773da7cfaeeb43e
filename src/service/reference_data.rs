// src/service/reference_data.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::{
    db::Store,
    models::propertymodel::{ReferenceKind, ReferenceType},
};

pub const REFERENCE_DATA_TTL: Duration = Duration::from_secs(60);

/// Read-through cache over the property type and approval type lookup
/// tables. Entries are refreshed from the store once older than the TTL.
#[derive(Debug)]
pub struct ReferenceData {
    store: Arc<dyn Store>,
    ttl: Duration,
    entries: RwLock<HashMap<ReferenceKind, (Instant, Arc<Vec<ReferenceType>>)>>,
}

impl ReferenceData {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn records(&self, kind: ReferenceKind) -> Result<Arc<Vec<ReferenceType>>, sqlx::Error> {
        if let Some((loaded_at, records)) = self.entries.read().await.get(&kind) {
            if loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(records));
            }
        }

        let records = Arc::new(self.store.get_reference_types(kind).await?);
        tracing::debug!("Loaded {} {} rows", records.len(), kind.table());

        self.entries
            .write()
            .await
            .insert(kind, (Instant::now(), Arc::clone(&records)));

        Ok(records)
    }

    /// Names of active entries, sorted and without duplicates.
    pub async fn active_names(&self, kind: ReferenceKind) -> Result<Vec<String>, sqlx::Error> {
        let records = self.records(kind).await?;
        Ok(sorted_names(records.iter().filter(|r| r.is_active())))
    }

    /// Active property types that sellers may pick when listing.
    pub async fn seller_visible_names(&self) -> Result<Vec<String>, sqlx::Error> {
        let records = self.records(ReferenceKind::PropertyType).await?;
        Ok(sorted_names(
            records.iter().filter(|r| r.is_active() && r.visible_to_seller),
        ))
    }

    pub async fn is_known(&self, kind: ReferenceKind, name: &str) -> Result<bool, sqlx::Error> {
        let records = self.records(kind).await?;
        Ok(records.iter().any(|r| r.is_active() && r.name == name))
    }
}

fn sorted_names<'a>(records: impl Iterator<Item = &'a ReferenceType>) -> Vec<String> {
    let mut names: Vec<String> = records.map(|r| r.name.clone()).collect();
    names.sort();
    names.dedup();
    names
}
