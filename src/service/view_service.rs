// src/service/view_service.rs
//
// View counting. A view is logged once per (property, viewer, local calendar
// day); only a newly logged view bumps the denormalised `view_count`. The
// store's uniqueness constraint settles concurrent duplicates.
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::Store,
    models::{
        propertymodel::Property,
        usermodel::{User, UserRole},
        viewmodel::{InsertOutcome, PropertyView, ViewStats, ViewerIdentity},
    },
    service::error::ServiceError,
};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

const ANALYTICS_RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOutcome {
    pub recorded: bool,
    /// New counter value. `None` when the view was not new, or when it was
    /// logged but the counter update failed.
    pub view_count: Option<i64>,
}

impl ViewOutcome {
    fn already_viewed() -> Self {
        Self {
            recorded: false,
            view_count: None,
        }
    }

    fn recorded(view_count: Option<i64>) -> Self {
        Self {
            recorded: true,
            view_count,
        }
    }
}

pub struct PropertyViewService {
    store: Arc<dyn Store>,
    clock: Clock,
}

impl std::fmt::Debug for PropertyViewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyViewService")
            .field("store", &self.store.backend_name())
            .finish()
    }
}

/// The dedup window: the calendar date in server-local time.
pub fn view_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

impl PropertyViewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(Utc::now))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Clock) -> Self {
        Self { store, clock }
    }

    async fn ensure_property(&self, property_id: Uuid) -> Result<Property, ServiceError> {
        self.store
            .get_property_by_id(property_id)
            .await?
            .ok_or(ServiceError::PropertyNotFound(property_id))
    }

    pub async fn record_view(
        &self,
        property_id: Uuid,
        viewer: Option<ViewerIdentity>,
    ) -> Result<ViewOutcome, ServiceError> {
        self.ensure_property(property_id).await?;
        let viewer = viewer.ok_or(ServiceError::ViewerUnknown)?;

        let now = (self.clock)();
        let day = view_day(now);
        let viewer_key = viewer.key();

        if self
            .store
            .find_view(property_id, &viewer_key, day)
            .await?
            .is_some()
        {
            return Ok(ViewOutcome::already_viewed());
        }

        let view = PropertyView::new(property_id, &viewer, day, now);
        if self.store.insert_view(&view).await? == InsertOutcome::Duplicate {
            tracing::debug!("Concurrent duplicate view of {} by {}", property_id, viewer_key);
            return Ok(ViewOutcome::already_viewed());
        }

        match self.store.increment_view_count(property_id).await {
            Ok(Some(view_count)) => Ok(ViewOutcome::recorded(Some(view_count))),
            Ok(None) => {
                tracing::error!("Property {} disappeared after its view was logged", property_id);
                Ok(ViewOutcome::recorded(None))
            }
            Err(e) => {
                tracing::error!(
                    "View of {} logged but view_count update failed: {}. Reconciliation will repair it.",
                    property_id,
                    e
                );
                Ok(ViewOutcome::recorded(None))
            }
        }
    }

    /// Old-client path. Same calendar-day policy keyed on the client address
    /// only; answers with the current counter whether or not the view was new.
    pub async fn record_legacy_view(
        &self,
        property_id: Uuid,
        ip_address: Option<String>,
    ) -> Result<i64, ServiceError> {
        let viewer = ViewerIdentity::resolve(None, ip_address);
        let outcome = self.record_view(property_id, viewer).await?;

        match outcome.view_count {
            Some(view_count) => Ok(view_count),
            None => Ok(self.ensure_property(property_id).await?.view_count),
        }
    }

    /// Admins see every property; sellers only their own listings.
    pub async fn analytics(&self, property_id: Uuid, requester: &User) -> Result<ViewStats, ServiceError> {
        let property = self.ensure_property(property_id).await?;
        if requester.role != UserRole::Admin && property.seller_id != requester.id {
            return Err(ServiceError::NotPropertyOwner(property_id));
        }
        let recent_since = (self.clock)() - Duration::days(ANALYTICS_RECENT_DAYS);

        Ok(self.store.get_view_stats(property_id, recent_since).await?)
    }

    /// Raises `view_count` to the number of distinct (viewer, day) entries
    /// in the log. Never lowers the counter.
    pub async fn reconcile(&self, property_id: Uuid) -> Result<i64, ServiceError> {
        let logged = self.store.count_distinct_views(property_id).await?;
        let view_count = self
            .store
            .raise_view_count(property_id, logged)
            .await?
            .ok_or(ServiceError::PropertyNotFound(property_id))?;

        tracing::info!(
            "Reconciled view_count of {}: {} logged views, counter now {}",
            property_id,
            logged,
            view_count
        );
        Ok(view_count)
    }
}
