// ── Owned-number store ──
//
// Session-scoped collection of the caller's numbers. Lookups go through a
// `DashMap`; the ordered snapshot (backend order) sits in a `watch` cell so
// readers take a cheap `Arc` clone without holding anything across await.
//
// Only ever replaced wholesale by a re-fetch. Created per session and
// cleared on reset. Never process-global.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::OwnedPhoneNumber;

pub type OwnedSnapshot = Arc<Vec<Arc<OwnedPhoneNumber>>>;

pub struct OwnedStore {
    by_id: DashMap<String, Arc<OwnedPhoneNumber>>,
    /// Ordered snapshot, rebuilt on every replace.
    snapshot: watch::Sender<OwnedSnapshot>,
}

impl OwnedStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Replace the whole collection with a fresh fetch, keeping its order.
    ///
    /// Later duplicates of an id are dropped.
    pub fn replace_all(&self, numbers: Vec<OwnedPhoneNumber>) {
        self.by_id.clear();
        let mut ordered = Vec::with_capacity(numbers.len());
        for number in numbers {
            if self.by_id.contains_key(number.id()) {
                tracing::warn!(id = %number.id(), "duplicate owned number in refresh, dropping");
                continue;
            }
            let number = Arc::new(number);
            self.by_id
                .insert(number.id().to_owned(), Arc::clone(&number));
            ordered.push(number);
        }
        self.publish(ordered);
    }

    pub fn get(&self, id: &str) -> Option<Arc<OwnedPhoneNumber>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> OwnedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn clear(&self) {
        self.by_id.clear();
        self.publish(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn publish(&self, ordered: Vec<Arc<OwnedPhoneNumber>>) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(ordered));
    }
}

impl Default for OwnedStore {
    fn default() -> Self {
        Self::new()
    }
}
