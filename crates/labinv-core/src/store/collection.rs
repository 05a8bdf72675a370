// ── Reactive document collection ──
//
// Concurrent map of documents keyed by id, plus a sorted snapshot that
// is rebuilt on every mutation.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::EntityId;

type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// Ordering applied to every snapshot.
pub(crate) type SortFn<T> = fn(&T, &T) -> Ordering;

/// One collection of documents (items, vendors, item types).
///
/// Reads are cheap snapshot clones; writers rebuild the snapshot so
/// readers always see a complete, ordered list.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_id: DashMap<EntityId, Arc<T>>,
    order: SortFn<T>,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new(order: SortFn<T>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            order,
            snapshot,
        }
    }

    /// Insert or replace a document. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: EntityId, entity: T) -> bool {
        let is_new = self.by_id.insert(id, Arc::new(entity)).is_none();
        self.rebuild_snapshot();
        is_new
    }

    /// Replace the whole collection with a fresh listing.
    ///
    /// Ids missing from `entities` are dropped. The snapshot is rebuilt once.
    pub(crate) fn replace_all(&self, entities: impl IntoIterator<Item = (EntityId, T)>) {
        let mut seen = HashSet::new();
        for (id, entity) in entities {
            seen.insert(id.clone());
            self.by_id.insert(id, Arc::new(entity));
        }
        self.by_id.retain(|id, _| seen.contains(id));
        self.rebuild_snapshot();
    }

    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.by_id.clear();
        self.rebuild_snapshot();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        let order = self.order;
        values.sort_by(|a, b| order(a, b));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[allow(clippy::ptr_arg)]
    fn by_value(a: &String, b: &String) -> Ordering {
        a.cmp(b)
    }

    fn col() -> EntityCollection<String> {
        EntityCollection::new(by_value)
    }

    #[test]
    fn upsert_reports_new_ids() {
        let c = col();
        assert!(c.upsert("a".into(), "x".into()));
        assert!(!c.upsert("a".into(), "y".into()));
        assert_eq!(*c.get(&"a".into()).unwrap(), "y");
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn snapshot_is_sorted() {
        let c = col();
        c.upsert("1".into(), "zener".into());
        c.upsert("2".into(), "anode".into());
        c.upsert("3".into(), "mosfet".into());

        let snap = c.snapshot();
        let names: Vec<&str> = snap.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["anode", "mosfet", "zener"]);
    }

    #[test]
    fn replace_all_prunes_missing_ids() {
        let c = col();
        c.upsert("old".into(), "gone".into());
        c.upsert("keep".into(), "v1".into());

        c.replace_all([("keep".into(), "v2".into()), ("new".into(), "n".into())]);

        assert!(c.get(&"old".into()).is_none());
        assert_eq!(*c.get(&"keep".into()).unwrap(), "v2");
        assert_eq!(c.snapshot().len(), 2);
    }

    #[test]
    fn remove_and_clear_update_snapshot() {
        let c = col();
        c.upsert("a".into(), "x".into());
        c.upsert("b".into(), "y".into());

        assert_eq!(*c.remove(&"a".into()).unwrap(), "x");
        assert!(c.remove(&"a".into()).is_none());
        assert_eq!(c.snapshot().len(), 1);

        c.clear();
        assert!(c.snapshot().is_empty());
    }
}
