use crate::error::CacheError;
use crate::store::CacheStore;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type InFlight = Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>;

/// A value served by the coordinator and whether it came from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached {
    pub value: Value,
    pub hit: bool,
}

/// Read-through cache with single-flight computation.
///
/// For a given key only one caller computes at a time. Callers that miss
/// while a computation is running wait for it and then read the stored result.
/// Failed computations are never stored, so the next waiter retries.
///
/// The computation and the store write run on their own task, so a caller
/// that goes away mid-request still leaves the result cached.
///
/// Store failures degrade to a miss (on read) or an uncached result (on
/// write); they are logged and never fail the request.
pub struct CacheCoordinator {
    store: Arc<dyn CacheStore>,
    in_flight: InFlight,
}

impl CacheCoordinator {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<Cached, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: From<CacheError> + Send + 'static,
    {
        if let Some(value) = lookup(self.store.as_ref(), key).await {
            return Ok(Cached { value, hit: true });
        }

        let lock = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = lock.lock_owned().await;

        // Whoever held the lock before us may have stored the value.
        if let Some(value) = lookup(self.store.as_ref(), key).await {
            drop(guard);
            release(&self.in_flight, key).await;
            return Ok(Cached { value, hit: true });
        }

        let store = self.store.clone();
        let in_flight = self.in_flight.clone();
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let result = match compute().await {
                Ok(value) => {
                    if let Err(e) = store.set(&owned_key, value.clone(), ttl).await {
                        tracing::warn!(key = %owned_key, error = %e, "Failed to store computed result.");
                    }
                    Ok(value)
                }
                Err(e) => Err(e),
            };
            drop(guard);
            release(&in_flight, &owned_key).await;
            result
        });

        match task.await {
            Ok(result) => result.map(|value| Cached { value, hit: false }),
            Err(e) => {
                release(&self.in_flight, key).await;
                Err(CacheError::Task(e.to_string()).into())
            }
        }
    }

    pub async fn in_flight_keys(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

async fn lookup(store: &dyn CacheStore, key: &str) -> Option<Value> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Cache read failed, treating as a miss.");
            None
        }
    }
}

/// Drops the key's lock once nobody else holds a handle to it.
async fn release(in_flight: &Mutex<HashMap<String, Arc<Mutex<()>>>>, key: &str) {
    let mut in_flight = in_flight.lock().await;
    if in_flight.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
        in_flight.remove(key);
    }
}
