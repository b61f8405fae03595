//! Client-side view of the restaurant set.

use dinemap_protocol::{RestaurantFilter, RestaurantId, RestaurantRecord, SyncEvent};
use std::collections::BTreeMap;

/// What applying one event did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    /// The view was replaced by a snapshot of this many records.
    Replaced(usize),
    /// An existing record was replaced.
    Updated(RestaurantId),
    /// A record was added.
    Inserted(RestaurantId),
}

/// Local copy of the server's restaurants, keyed by id.
///
/// Snapshots replace the whole view. Updates and creations are
/// insert-or-replace, so an update for an id the view has never seen
/// simply adds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientView {
    records: BTreeMap<RestaurantId, RestaurantRecord>,
}

impl ClientView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event.
    pub fn apply(&mut self, event: SyncEvent) -> ViewChange {
        match event {
            SyncEvent::Snapshot(records) => {
                self.records = records.into_iter().map(|r| (r.id, r)).collect();
                ViewChange::Replaced(self.records.len())
            }
            SyncEvent::Updated(record) | SyncEvent::Created(record) => {
                let id = record.id;
                match self.records.insert(id, record) {
                    Some(_) => ViewChange::Updated(id),
                    None => ViewChange::Inserted(id),
                }
            }
        }
    }

    /// Returns one record.
    pub fn get(&self, id: RestaurantId) -> Option<&RestaurantRecord> {
        self.records.get(&id)
    }

    /// Returns every record in id order.
    pub fn records(&self) -> Vec<RestaurantRecord> {
        self.records.values().cloned().collect()
    }

    /// Returns the records matching `filter`, in id order.
    pub fn query(&self, filter: &RestaurantFilter) -> Vec<RestaurantRecord> {
        self.records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the view holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Empties the view.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dinemap_protocol::RestaurantDraft;

    fn record(id: u64, name: &str, cuisine: &str) -> RestaurantRecord {
        RestaurantDraft::new(name, 47.37, 8.54, "restaurant", cuisine)
            .into_record(RestaurantId(id), Utc::now())
            .unwrap()
    }

    #[test]
    fn snapshot_then_update() {
        let a = record(1, "A", "italienisch");
        let b = record(2, "B", "japanisch");
        let mut a2 = a.clone();
        a2.is_open = false;

        let mut view = ClientView::new();
        assert_eq!(
            view.apply(SyncEvent::Snapshot(vec![a, b.clone()])),
            ViewChange::Replaced(2)
        );
        assert_eq!(
            view.apply(SyncEvent::Updated(a2.clone())),
            ViewChange::Updated(RestaurantId(1))
        );

        assert_eq!(view.records(), vec![a2, b]);
    }

    #[test]
    fn update_for_unknown_id_inserts() {
        let mut view = ClientView::new();
        let change = view.apply(SyncEvent::Updated(record(9, "Late", "thai")));
        assert_eq!(change, ViewChange::Inserted(RestaurantId(9)));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn snapshot_replaces_everything() {
        let mut view = ClientView::new();
        view.apply(SyncEvent::Created(record(7, "Gone", "thai")));
        view.apply(SyncEvent::Snapshot(vec![record(1, "A", "thai")]));

        assert!(view.get(RestaurantId(7)).is_none());
        assert_eq!(view.len(), 1);

        view.apply(SyncEvent::Snapshot(vec![]));
        assert!(view.is_empty());
    }

    #[test]
    fn query_filters_in_id_order() {
        let mut view = ClientView::new();
        view.apply(SyncEvent::Snapshot(vec![
            record(3, "C", "Japanisch"),
            record(1, "A", "italienisch"),
            record(2, "B", "japanisch"),
        ]));

        let names: Vec<_> = view
            .query(&RestaurantFilter::new().with_cuisine("japan"))
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }
}
