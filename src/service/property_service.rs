// src/service/property_service.rs
use std::sync::Arc;

use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        cache::{CacheHelper, FACETS_CACHE_KEY, FACETS_CACHE_TTL},
        Store,
    },
    dtos::propertydtos::{Pagination, SearchPropertiesQuery},
    models::{
        propertymodel::{PropertyWithSeller, ReferenceKind},
        usermodel::{User, UserRole},
    },
    service::{
        error::ServiceError,
        price_ranges::{build_price_ranges, PriceRange},
        property_filter::{by_approval, by_city, by_price, by_text, by_type, by_verified, Predicate, PropertyFilter},
        reference_data::ReferenceData,
    },
};

/// `seller_id` value that scopes the search to the authenticated caller.
pub const SELLER_ID_SELF: &str = "me";

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub items: Vec<PropertyWithSeller>,
    pub total_count: i64,
    pub pagination: Pagination,
}

impl SearchPage {
    pub fn total_pages(&self) -> i64 {
        if self.total_count <= 0 {
            return 0;
        }
        (self.total_count + self.pagination.limit - 1) / self.pagination.limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub types: Vec<String>,
    pub approvals: Vec<String>,
    pub locations: Vec<String>,
    pub price_ranges: Vec<PriceRange>,
    pub min_price: i64,
    pub max_price: i64,
}

pub struct PropertySearchService {
    store: Arc<dyn Store>,
    reference: Arc<ReferenceData>,
    cache: Option<Arc<ConnectionManager>>,
}

impl std::fmt::Debug for PropertySearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertySearchService")
            .field("store", &self.store.backend_name())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl PropertySearchService {
    pub fn new(
        store: Arc<dyn Store>,
        reference: Arc<ReferenceData>,
        cache: Option<Arc<ConnectionManager>>,
    ) -> Self {
        Self {
            store,
            reference,
            cache,
        }
    }

    pub async fn search(
        &self,
        query: &SearchPropertiesQuery,
        caller: Option<&User>,
    ) -> Result<SearchPage, ServiceError> {
        query
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let pagination = query.pagination();
        let filter = self.build_filter(query, caller).await?;

        let (total_count, items) = tokio::try_join!(
            self.store.count_properties(&filter),
            self.store.find_properties(&filter, pagination.limit, pagination.offset()),
        )?;

        tracing::debug!(
            "Property search matched {} (page {}, limit {})",
            total_count,
            pagination.page,
            pagination.limit
        );

        Ok(SearchPage {
            items,
            total_count,
            pagination,
        })
    }

    /// Turns the loose query string into predicates. Role expansion needs a
    /// lookup, everything else is pure.
    pub async fn build_filter(
        &self,
        query: &SearchPropertiesQuery,
        caller: Option<&User>,
    ) -> Result<PropertyFilter, ServiceError> {
        self.log_unknown_reference(ReferenceKind::PropertyType, query.property_type.as_deref())
            .await;
        self.log_unknown_reference(ReferenceKind::ApprovalType, query.approval.as_deref())
            .await;

        let mut filter = PropertyFilter::new()
            .and(by_type(query.property_type.as_deref()))
            .and(by_approval(query.approval.as_deref()))
            .and(by_city(query.location.as_deref()))
            .and(by_text(query.search.as_deref()))
            .and_all(by_price(query.min_price.as_deref(), query.max_price.as_deref()))
            .and(by_verified(query.is_verified.as_deref()))
            .and(seller_scope(query.seller_id.as_deref(), caller));

        let role = query.role.as_deref().and_then(UserRole::from_param);
        if role == Some(UserRole::Seller) {
            let seller_ids = self.store.get_user_ids_by_role(UserRole::Seller).await?;
            filter = filter.and(Some(Predicate::SellerIn(seller_ids)));
        }

        Ok(filter)
    }

    async fn log_unknown_reference(&self, kind: ReferenceKind, raw: Option<&str>) {
        let Some(name) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        if let Ok(false) = self.reference.is_known(kind, name).await {
            tracing::debug!("Search for unknown {} value {:?}", kind.table(), name);
        }
    }

    /// Filter dropdown data. Served from Redis when a fresh copy exists; a
    /// cache failure falls back to computing it.
    pub async fn facets(&self) -> Result<Facets, ServiceError> {
        if let Some(redis) = &self.cache {
            match CacheHelper::get::<Facets>(redis, FACETS_CACHE_KEY).await {
                Ok(Some(facets)) => return Ok(facets),
                Ok(None) => {}
                Err(e) => tracing::warn!("Facet cache read failed: {}", e),
            }
        }

        let (types, approvals, locations, stats) = tokio::try_join!(
            self.reference.active_names(ReferenceKind::PropertyType),
            self.reference.active_names(ReferenceKind::ApprovalType),
            self.store.get_distinct_cities(),
            self.store.get_price_stats(),
        )?;

        let facets = Facets {
            types,
            approvals,
            locations,
            price_ranges: build_price_ranges(stats.max_price),
            min_price: stats.min_price,
            max_price: stats.max_price,
        };

        if let Some(redis) = &self.cache {
            if let Err(e) = CacheHelper::set(redis, FACETS_CACHE_KEY, &facets, FACETS_CACHE_TTL).await {
                tracing::warn!("Facet cache write failed: {}", e);
            }
        }

        Ok(facets)
    }

    pub async fn seller_property_types(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.reference.seller_visible_names().await?)
    }
}

/// `seller_id=<uuid>` restricts to that seller, `seller_id=me` to the
/// caller. Anything else is an exact match that nothing satisfies.
fn seller_scope(raw: Option<&str>, caller: Option<&User>) -> Option<Predicate> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;

    if raw.eq_ignore_ascii_case(SELLER_ID_SELF) {
        return match caller {
            Some(user) => Some(Predicate::SellerIn(vec![user.id])),
            None => {
                tracing::warn!("seller_id=me sent without authentication; ignoring seller scope");
                None
            }
        };
    }

    match Uuid::parse_str(raw) {
        Ok(id) => Some(Predicate::SellerIn(vec![id])),
        Err(_) => Some(Predicate::SellerIn(Vec::new())),
    }
}
