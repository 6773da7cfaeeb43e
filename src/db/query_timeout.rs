// Database query timeout protection
use std::time::Duration;
use tokio::time::timeout;

pub struct QueryTimeout;

impl QueryTimeout {
    /// Run a query future, failing with an I/O timeout error when it takes too long.
    pub async fn run<F, T>(query_fn: F, timeout_duration: Duration) -> Result<T, sqlx::Error>
    where
        F: std::future::Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(timeout_duration, query_fn).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Query timed out after {:?}", timeout_duration);
                Err(sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("Query timed out after {:?}", timeout_duration),
                )))
            }
        }
    }

    /// Default timeout for most queries (5 seconds)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Longer timeout for aggregations over the whole catalogue (30 seconds)
    pub const AGGREGATION_TIMEOUT: Duration = Duration::from_secs(30);

    /// Short timeout for simple lookups (2 seconds)
    pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);
}
