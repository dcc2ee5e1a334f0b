use anyhow::{Context, Result, anyhow};
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

/// Values are stored as JSON text inside a postcard envelope; postcard
/// cannot decode the optional fields the wire types skip when absent.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Persistent TTL cache owned by the application state
#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
    ttl: Duration,
}

impl std::fmt::Debug for PersistentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

fn sweep_store(store: &Keyspace, keep_prefix: &[u8]) -> Result<usize> {
    let now = now_secs()?;
    let mut stale = Vec::new();
    for guard in store.iter() {
        let (key, value) = guard.into_inner()?;
        let fresh = postcard::from_bytes::<StoredEntry>(&value)
            .is_ok_and(|entry| entry.expires_at > now);
        if !fresh || !key.starts_with(keep_prefix) {
            stale.push(key);
        }
    }

    let removed = stale.len();
    for key in stale {
        store.remove(key)?;
    }
    Ok(removed)
}

impl PersistentCache {
    /// Open (or create) the cache database under `path`
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open cache at {}", path.display()))?;
        let store = db.keyspace("search", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { store, ttl })
    }

    /// Stores a serializable value under the configured TTL.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.put_with_ttl(key, value, self.ttl).await
    }

    #[tracing::instrument(name = "put_cache_ttl", level = "debug", skip(self, value))]
    pub async fn put_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry {
            value: serde_json::to_string(value)?,
            expires_at,
        };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await?
            .map_err(|e| anyhow!("Cache write failed: {e:?}"))?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry = postcard::from_bytes(&bytes)?;
        if now_secs()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(serde_json::from_str(&entry.value)?))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Drops expired entries and every entry whose key lacks `keep_prefix`.
    /// Returns how many entries were removed.
    #[tracing::instrument(name = "sweep_cache", level = "debug", skip(self))]
    pub async fn sweep(&self, keep_prefix: &str) -> Result<usize> {
        let store = self.store.clone();
        let keep_prefix = keep_prefix.as_bytes().to_vec();
        let removed = task::spawn_blocking(move || sweep_store(&store, &keep_prefix)).await??;
        tracing::debug!(removed, "Cache swept");
        Ok(removed)
    }

    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await?
            .map_err(|e| anyhow!("Cache remove failed: {e:?}"))?;
        Ok(())
    }
}
