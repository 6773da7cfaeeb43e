// db/memory.rs
//
// In-process store used when no DATABASE_URL is configured, and by the test
// suite. It mirrors the Postgres semantics of the *Ext traits, including the
// (property, viewer, day) uniqueness of the view log.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{lookupdb::LookupExt, propertydb::PropertyExt, userdb::UserExt, viewdb::PropertyViewExt, Store},
    models::{
        propertymodel::{PriceStats, Property, PropertyWithSeller, ReferenceKind, ReferenceType, SellerSummary},
        usermodel::{User, UserRole},
        viewmodel::{InsertOutcome, PropertyView, ViewStats},
    },
    service::property_filter::PropertyFilter,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Initial contents for a `MemoryStore`, loaded from a JSON file.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub property_types: Vec<ReferenceType>,
    #[serde(default)]
    pub approval_types: Vec<ReferenceType>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

type ViewKey = (Uuid, String, NaiveDate);

#[derive(Debug, Default)]
struct MemoryData {
    properties: Vec<Property>,
    users: HashMap<Uuid, User>,
    property_types: Vec<ReferenceType>,
    approval_types: Vec<ReferenceType>,
    views: Vec<PropertyView>,
    view_keys: HashSet<ViewKey>,
}

impl MemoryData {
    #[cfg(test)]
    fn reference_types_mut(&mut self, kind: ReferenceKind) -> &mut Vec<ReferenceType> {
        match kind {
            ReferenceKind::PropertyType => &mut self.property_types,
            ReferenceKind::ApprovalType => &mut self.approval_types,
        }
    }

    fn seller_summary(&self, seller_id: Uuid) -> Option<SellerSummary> {
        self.users.get(&seller_id).map(|u| SellerSummary {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let data = MemoryData {
            users: seed.users.into_iter().map(|u| (u.id, u)).collect(),
            property_types: seed.property_types,
            approval_types: seed.approval_types,
            properties: seed.properties,
            ..MemoryData::default()
        };
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: Seed = serde_json::from_str(&raw)?;
        Ok(Self::from_seed(seed))
    }

    #[cfg(test)]
    pub async fn insert_property(&self, property: Property) {
        self.data.write().await.properties.push(property);
    }

    #[cfg(test)]
    pub async fn insert_user(&self, user: User) {
        self.data.write().await.users.insert(user.id, user);
    }

    #[cfg(test)]
    pub async fn insert_reference_type(&self, kind: ReferenceKind, record: ReferenceType) {
        self.data.write().await.reference_types_mut(kind).push(record);
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl PropertyExt for MemoryStore {
    async fn count_properties(&self, filter: &PropertyFilter) -> Result<i64, sqlx::Error> {
        let data = self.data.read().await;
        Ok(data.properties.iter().filter(|p| filter.matches(p)).count() as i64)
    }

    async fn find_properties(
        &self,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PropertyWithSeller>, sqlx::Error> {
        let data = self.data.read().await;

        let mut matching: Vec<&Property> = data.properties.iter().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|p| PropertyWithSeller {
                property: p.clone(),
                seller: data.seller_summary(p.seller_id),
            })
            .collect())
    }

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        let data = self.data.read().await;
        Ok(data.properties.iter().find(|p| p.id == property_id).cloned())
    }

    async fn get_price_stats(&self) -> Result<PriceStats, sqlx::Error> {
        let data = self.data.read().await;
        let prices = data.properties.iter().map(|p| p.price);
        Ok(PriceStats {
            min_price: prices.clone().min().unwrap_or(0),
            max_price: prices.max().unwrap_or(0),
        })
    }

    async fn get_distinct_cities(&self) -> Result<Vec<String>, sqlx::Error> {
        let data = self.data.read().await;
        let cities: BTreeSet<String> = data
            .properties
            .iter()
            .filter_map(|p| p.location.city())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Ok(cities.into_iter().collect())
    }

    async fn increment_view_count(&self, property_id: Uuid) -> Result<Option<i64>, sqlx::Error> {
        let mut data = self.data.write().await;
        Ok(data.properties.iter_mut().find(|p| p.id == property_id).map(|p| {
            p.view_count += 1;
            p.view_count
        }))
    }

    async fn raise_view_count(&self, property_id: Uuid, floor: i64) -> Result<Option<i64>, sqlx::Error> {
        let mut data = self.data.write().await;
        Ok(data.properties.iter_mut().find(|p| p.id == property_id).map(|p| {
            p.view_count = p.view_count.max(floor);
            p.view_count
        }))
    }
}

#[async_trait]
impl PropertyViewExt for MemoryStore {
    async fn find_view(
        &self,
        property_id: Uuid,
        viewer_key: &str,
        view_day: NaiveDate,
    ) -> Result<Option<PropertyView>, sqlx::Error> {
        let data = self.data.read().await;
        Ok(data
            .views
            .iter()
            .find(|v| v.property_id == property_id && v.viewer_key == viewer_key && v.view_day == view_day)
            .cloned())
    }

    async fn insert_view(&self, view: &PropertyView) -> Result<InsertOutcome, sqlx::Error> {
        let mut data = self.data.write().await;
        let key = (view.property_id, view.viewer_key.clone(), view.view_day);
        if !data.view_keys.insert(key) {
            return Ok(InsertOutcome::Duplicate);
        }
        data.views.push(view.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get_view_stats(
        &self,
        property_id: Uuid,
        recent_since: DateTime<Utc>,
    ) -> Result<ViewStats, sqlx::Error> {
        let data = self.data.read().await;
        let views: Vec<&PropertyView> = data.views.iter().filter(|v| v.property_id == property_id).collect();
        let unique_users: HashSet<Uuid> = views.iter().filter_map(|v| v.user_id).collect();

        Ok(ViewStats {
            total_views: views.len() as i64,
            unique_users: unique_users.len() as i64,
            last_7_days_views: views.iter().filter(|v| v.viewed_at >= recent_since).count() as i64,
        })
    }

    async fn count_distinct_views(&self, property_id: Uuid) -> Result<i64, sqlx::Error> {
        let data = self.data.read().await;
        let distinct: HashSet<(&str, NaiveDate)> = data
            .views
            .iter()
            .filter(|v| v.property_id == property_id)
            .map(|v| (v.viewer_key.as_str(), v.view_day))
            .collect();
        Ok(distinct.len() as i64)
    }
}

#[async_trait]
impl LookupExt for MemoryStore {
    async fn get_reference_types(&self, kind: ReferenceKind) -> Result<Vec<ReferenceType>, sqlx::Error> {
        let data = self.data.read().await;
        let mut records = match kind {
            ReferenceKind::PropertyType => data.property_types.clone(),
            ReferenceKind::ApprovalType => data.approval_types.clone(),
        };
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    async fn get_user_ids_by_role(&self, role: UserRole) -> Result<Vec<Uuid>, sqlx::Error> {
        let data = self.data.read().await;
        Ok(data.users.values().filter(|u| u.role == role).map(|u| u.id).collect())
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.data.read().await.users.get(&user_id).cloned())
    }
}
