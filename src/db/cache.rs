// db/cache.rs
use std::sync::Arc;

use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};

/// Facet lists change only when listings are added or repriced.
pub const FACETS_CACHE_TTL: usize = 300; // 5 minutes
pub const FACETS_CACHE_KEY: &str = "cache:facets";

/// Opens a managed Redis connection. Any failure leaves the service running
/// without a cache.
pub async fn connect_redis(redis_url: &str) -> Option<Arc<ConnectionManager>> {
    match redis::Client::open(redis_url) {
        Ok(client) => match ConnectionManager::new(client).await {
            Ok(conn) => {
                tracing::info!("Redis connection established");
                Some(Arc::new(conn))
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Continuing without cache.", e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to create Redis client: {}. Continuing without cache.", e);
            None
        }
    }
}

pub struct CacheHelper;

impl CacheHelper {
    pub async fn get<T: DeserializeOwned>(
        redis: &Arc<ConnectionManager>,
        key: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let mut conn = ConnectionManager::clone(redis);
        let cached: Option<String> = conn.get(key).await?;

        match cached {
            Some(data) => match serde_json::from_str::<T>(&data) {
                Ok(value) => {
                    tracing::debug!("Cache HIT: {}", key);
                    Ok(Some(value))
                }
                Err(e) => {
                    tracing::warn!("Cache deserialization failed for {}: {}", key, e);
                    Ok(None)
                }
            },
            None => {
                tracing::debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize>(
        redis: &Arc<ConnectionManager>,
        key: &str,
        value: &T,
        ttl_seconds: usize,
    ) -> Result<(), redis::RedisError> {
        if let Ok(json) = serde_json::to_string(value) {
            let mut conn = ConnectionManager::clone(redis);
            let _: () = conn.set_ex(key, json, ttl_seconds).await?;
            tracing::debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        }
        Ok(())
    }
}
