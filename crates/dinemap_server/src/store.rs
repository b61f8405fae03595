//! Restaurant store.

use crate::error::{ServerError, ServerResult};
use crate::seed::demo_restaurants;
use chrono::{DateTime, Duration, Utc};
use dinemap_protocol::{RestaurantDraft, RestaurantId, RestaurantRecord};
use parking_lot::RwLock;

/// The server's collection of restaurants.
///
/// The store is the single source of truth. It is owned by whoever
/// constructs the server and shared through `Arc`, never through a
/// global. Every mutation takes the write lock and is visible to the
/// next read.
pub struct RestaurantStore {
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    /// Records in insertion order.
    records: Vec<RestaurantRecord>,
    /// Last timestamp handed out; stamps never repeat or go backwards.
    last_stamp: Option<DateTime<Utc>>,
}

impl StoreInner {
    fn position(&self, id: RestaurantId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn next_id(&self) -> ServerResult<RestaurantId> {
        match self.records.iter().map(|r| r.id).max() {
            None => Ok(RestaurantId(1)),
            Some(max) => max
                .next()
                .ok_or_else(|| ServerError::Internal(format!("no id left after {max}"))),
        }
    }

    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl RestaurantStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Creates a store holding the demo restaurants.
    pub fn seeded() -> Self {
        Self::from_records(demo_restaurants())
    }

    /// Creates a store from existing records.
    pub fn from_records(records: Vec<RestaurantRecord>) -> Self {
        let last_stamp = records
            .iter()
            .flat_map(|r| [r.last_updated, r.created_at])
            .flatten()
            .max();
        Self {
            inner: RwLock::new(StoreInner {
                records,
                last_stamp,
            }),
        }
    }

    /// Returns the number of restaurants.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Returns true if a restaurant with this id exists.
    pub fn contains(&self, id: RestaurantId) -> bool {
        self.inner.read().position(id).is_some()
    }

    /// Gets a restaurant by id.
    pub fn get(&self, id: RestaurantId) -> ServerResult<RestaurantRecord> {
        let inner = self.inner.read();
        inner
            .position(id)
            .map(|idx| inner.records[idx].clone())
            .ok_or(ServerError::NotFound(id))
    }

    /// Returns all restaurants matching `predicate`, in insertion order.
    pub fn list<P>(&self, predicate: P) -> Vec<RestaurantRecord>
    where
        P: Fn(&RestaurantRecord) -> bool,
    {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Runs `f` over the current records while holding the read lock.
    ///
    /// No mutation can start until `f` returns.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&[RestaurantRecord]) -> R) -> R {
        let inner = self.inner.read();
        f(&inner.records)
    }

    /// Sets the open status of a restaurant and stamps `last_updated`.
    pub fn upsert_status(&self, id: RestaurantId, is_open: bool) -> ServerResult<RestaurantRecord> {
        let mut inner = self.inner.write();
        let idx = inner.position(id).ok_or(ServerError::NotFound(id))?;
        let stamp = inner.next_stamp();

        let record = &mut inner.records[idx];
        record.is_open = is_open;
        record.last_updated = Some(stamp);
        Ok(record.clone())
    }

    /// Validates `draft` and appends the resulting restaurant.
    ///
    /// The new id is one past the largest existing id, or 1 if the store
    /// is empty. A rejected draft leaves the store untouched.
    pub fn insert(&self, draft: RestaurantDraft) -> ServerResult<RestaurantRecord> {
        draft.validate()?;

        let mut inner = self.inner.write();
        let id = inner.next_id()?;
        let stamp = inner.next_stamp();
        let record = draft.into_record(id, stamp)?;
        inner.records.push(record.clone());
        Ok(record)
    }
}

impl Default for RestaurantStore {
    fn default() -> Self {
        Self::new()
    }
}
