// Query-keyed caching decorator over a variable repository
use crate::application::variable_repository::{FetchError, VariableRepository};
use crate::domain::variable::VariableRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CacheEntry {
    inserted_at: Instant,
    ttl: Option<Duration>,
    records: Vec<VariableRecord>,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.ttl.is_none_or(|ttl| self.inserted_at.elapsed() <= ttl)
    }
}

/// Caches query results by operation + parameters. Full and per-module
/// queries never go stale; date-range queries expire after `range_ttl`.
/// Errors are never cached, so a failed query is re-attempted on the next
/// call.
pub struct CachedVariableRepository {
    inner: Arc<dyn VariableRepository>,
    range_ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CachedVariableRepository {
    pub fn new(inner: Arc<dyn VariableRepository>, range_ttl: Duration) -> Self {
        Self {
            inner,
            range_ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }

    async fn lookup(&self, key: &str) -> Option<Vec<VariableRecord>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh() => {
                tracing::debug!("cache hit for {}", key);
                Some(entry.records.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn store(&self, key: String, ttl: Option<Duration>, records: &[VariableRecord]) {
        self.entries.lock().await.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                ttl,
                records: records.to_vec(),
            },
        );
    }
}

#[async_trait]
impl VariableRepository for CachedVariableRepository {
    async fn fetch_all(&self) -> Result<Vec<VariableRecord>, FetchError> {
        if let Some(records) = self.lookup("all").await {
            return Ok(records);
        }
        let records = self.inner.fetch_all().await?;
        self.store("all".to_string(), None, &records).await;
        Ok(records)
    }

    async fn fetch_by_module(&self, module: &str) -> Result<Vec<VariableRecord>, FetchError> {
        let key = format!("module:{module}");
        if let Some(records) = self.lookup(&key).await {
            return Ok(records);
        }
        let records = self.inner.fetch_by_module(module).await?;
        self.store(key, None, &records).await;
        Ok(records)
    }

    async fn fetch_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<VariableRecord>, FetchError> {
        let key = format!("range:{start}:{end}");
        if let Some(records) = self.lookup(&key).await {
            return Ok(records);
        }
        let records = self.inner.fetch_by_date_range(start, end).await?;
        self.store(key, Some(self.range_ttl), &records).await;
        Ok(records)
    }
}
