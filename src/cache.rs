// Snapshot caching.
//
// Loading the full snapshot from SQLite is the expensive step of every
// calculation, so the loaded `Dataset` is cached behind a TTL. A failed
// reload falls back to the previous snapshot instead of failing the
// request; imports must call `invalidate` so the next read is fresh.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::db::Database;
use crate::model::Dataset;

/// Where the returned snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFreshness {
    /// Loaded from the store on this call.
    Fresh,
    /// Served from cache within the TTL.
    Cached,
    /// The TTL expired but the reload failed; this is the previous snapshot.
    Stale,
}

/// Anything that can produce a snapshot. The database implements this; tests
/// substitute their own loaders.
pub trait SnapshotLoader {
    fn load_snapshot(&self) -> Result<Dataset>;
}

impl SnapshotLoader for Database {
    fn load_snapshot(&self) -> Result<Dataset> {
        Database::load_snapshot(self)
    }
}

struct CacheSlot {
    snapshot: Arc<Dataset>,
    loaded_at: Instant,
}

/// A TTL cache over snapshot loads.
pub struct SnapshotCache<L> {
    loader: L,
    ttl: Duration,
    slot: Mutex<Option<CacheSlot>>,
}

impl<L: SnapshotLoader> SnapshotCache<L> {
    pub fn new(loader: L, ttl: Duration) -> Self {
        Self {
            loader,
            ttl,
            slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<CacheSlot>> {
        self.slot.lock().expect("snapshot cache mutex poisoned")
    }

    /// Get the current snapshot, reloading if the cached one has expired.
    /// A reload failure with a previous snapshot in hand degrades to that
    /// snapshot; with no previous snapshot the error propagates.
    pub fn get_snapshot(&self) -> Result<(Arc<Dataset>, SnapshotFreshness)> {
        let mut slot = self.slot();

        if let Some(cached) = slot.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                debug!("serving snapshot from cache");
                return Ok((Arc::clone(&cached.snapshot), SnapshotFreshness::Cached));
            }
        }

        match self.loader.load_snapshot() {
            Ok(dataset) => {
                let snapshot = Arc::new(dataset);
                *slot = Some(CacheSlot {
                    snapshot: Arc::clone(&snapshot),
                    loaded_at: Instant::now(),
                });
                Ok((snapshot, SnapshotFreshness::Fresh))
            }
            Err(err) => match slot.as_ref() {
                Some(cached) => {
                    warn!(error = %err, "snapshot reload failed; serving stale snapshot");
                    Ok((Arc::clone(&cached.snapshot), SnapshotFreshness::Stale))
                }
                None => Err(err),
            },
        }
    }

    /// Drop the cached snapshot so the next read reloads. Call after any
    /// import.
    pub fn invalidate(&self) {
        *self.slot() = None;
    }

    /// The underlying loader. Callers that own the database through the
    /// cache reach it here for imports.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}
