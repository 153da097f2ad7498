//! Per-run price cache
//!
//! Memoizes catalog responses by (service code, sorted filter list) for the
//! lifetime of one estimation run. Only successful non-empty results are
//! cached: a transport failure or an empty match set is re-attempted the
//! next time an identical query is issued, so a transient outage early in a
//! run cannot pin a node to "no data" for later lookups. Source errors are
//! absorbed here and surfaced to resolvers as an empty record list.

use crate::catalog::{Filter, PriceRecord, PriceSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

type CacheKey = (String, Vec<Filter>);

pub struct PriceCache {
    source: Box<dyn PriceSource>,
    entries: Mutex<HashMap<CacheKey, Arc<Vec<PriceRecord>>>>,
}

impl PriceCache {
    pub fn new(source: Box<dyn PriceSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return cached records for the query, or issue it against the source.
    ///
    /// Never fails: a source error is logged and reported as an empty list,
    /// indistinguishable from a zero-match query, per the adapter contract.
    pub async fn get_or_query(
        &self,
        service_code: &str,
        filters: &[Filter],
    ) -> Arc<Vec<PriceRecord>> {
        let mut sorted = filters.to_vec();
        sorted.sort();
        let key = (service_code.to_string(), sorted);

        if let Some(hit) = self.entries.lock().await.get(&key) {
            debug!("Price cache hit for {}", service_code);
            return Arc::clone(hit);
        }

        let records = match self.source.query(service_code, filters).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Catalog query for {} failed, treating as no data: {}", service_code, e);
                Vec::new()
            }
        };

        let records = Arc::new(records);
        if !records.is_empty() {
            self.entries
                .lock()
                .await
                .insert(key, Arc::clone(&records));
        }
        records
    }
}
