// conflux-core/src/application/cache.rs
//
// Input-keyed cache of metadata provider results, owned by one editing session.
// Every request carries a ticket; a response is kept only if its ticket is still the
// latest for that key and the key is still wanted by the current selection.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::domain::metadata::{Lookup, MetadataKey, MetadataLookup, MetadataValue};
use crate::ports::metadata::MetadataError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRequest {
    pub key: MetadataKey,
    pub ticket: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Provider call failed; cached as unavailable until retried.
    Failed(String),
    /// Superseded before it arrived.
    Discarded,
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Ready(MetadataValue),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: BTreeMap<MetadataKey, CacheEntry>,
    in_flight: BTreeMap<MetadataKey, u64>,
    next_ticket: u64,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests for wanted keys that are neither cached nor already in flight.
    pub fn issue(&mut self, wanted: &BTreeSet<MetadataKey>) -> Vec<MetadataRequest> {
        let mut requests = Vec::new();
        for key in wanted {
            if self.entries.contains_key(key) || self.in_flight.contains_key(key) {
                continue;
            }
            self.next_ticket += 1;
            self.in_flight.insert(key.clone(), self.next_ticket);
            requests.push(MetadataRequest {
                key: key.clone(),
                ticket: self.next_ticket,
            });
        }
        requests
    }

    pub fn accept(
        &mut self,
        request: &MetadataRequest,
        result: Result<MetadataValue, MetadataError>,
        wanted: &BTreeSet<MetadataKey>,
    ) -> Completion {
        let current = self.in_flight.get(&request.key) == Some(&request.ticket);
        if !current || !wanted.contains(&request.key) {
            debug!(
                key = %request.key,
                ticket = request.ticket,
                "Stale metadata response discarded"
            );
            return Completion::Discarded;
        }

        self.in_flight.remove(&request.key);
        match result {
            Ok(value) => {
                self.entries.insert(request.key.clone(), CacheEntry::Ready(value));
                Completion::Applied
            }
            Err(e) => {
                let reason = e.to_string();
                self.entries
                    .insert(request.key.clone(), CacheEntry::Failed(reason.clone()));
                Completion::Failed(reason)
            }
        }
    }

    /// Drops every cached or in-flight key the selection no longer needs.
    pub fn retain_wanted(&mut self, wanted: &BTreeSet<MetadataKey>) -> Vec<MetadataKey> {
        let stale: Vec<MetadataKey> = self
            .entries
            .keys()
            .chain(self.in_flight.keys())
            .filter(|k| !wanted.contains(*k))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for key in &stale {
            self.invalidate(key);
        }
        if !stale.is_empty() {
            debug!("Evicted {} metadata key(s)", stale.len());
        }
        stale
    }

    /// Forgets one key so the next `issue` fetches it again.
    pub fn invalidate(&mut self, key: &MetadataKey) {
        self.entries.remove(key);
        self.in_flight.remove(key);
    }

    pub fn get(&self, key: &MetadataKey) -> Option<&MetadataValue> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(value)) => Some(value),
            _ => None,
        }
    }

    /// Drops a failed entry so the next `issue` asks the provider again.
    pub fn forget_failure(&mut self, key: &MetadataKey) -> bool {
        if matches!(self.entries.get(key), Some(CacheEntry::Failed(_))) {
            self.entries.remove(key);
            true
        } else {
            false
        }
    }
}

impl MetadataLookup for MetadataCache {
    fn lookup(&self, key: &MetadataKey) -> Lookup<'_> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(value)) => Lookup::Ready(value),
            Some(CacheEntry::Failed(reason)) => Lookup::Unavailable(reason),
            None if self.in_flight.contains_key(key) => Lookup::Pending,
            None => Lookup::Missing,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tables(connection: i64) -> MetadataKey {
        MetadataKey::Tables {
            connection,
            schema: "public".into(),
        }
    }

    fn names(items: &[&str]) -> MetadataValue {
        MetadataValue::Names(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_issue_skips_cached_and_in_flight_keys() {
        let mut cache = MetadataCache::new();
        let wanted: BTreeSet<_> = [MetadataKey::Connections, tables(1)].into_iter().collect();

        let first = cache.issue(&wanted);
        assert_eq!(first.len(), 2);
        assert!(cache.issue(&wanted).is_empty());
        assert_eq!(cache.lookup(&tables(1)), Lookup::Pending);

        let applied = cache.accept(&first[1], Ok(names(&["orders"])), &wanted);
        assert_eq!(applied, Completion::Applied);
        assert!(cache.issue(&wanted).is_empty());
        assert_eq!(cache.get(&tables(1)), Some(&names(&["orders"])));
    }

    #[test]
    fn test_superseded_ticket_is_discarded() {
        let mut cache = MetadataCache::new();
        let wanted: BTreeSet<_> = [tables(1)].into_iter().collect();

        let old = cache.issue(&wanted).pop().unwrap();
        cache.retain_wanted(&BTreeSet::new());
        let new = cache.issue(&wanted).pop().unwrap();
        assert!(new.ticket > old.ticket);

        assert_eq!(
            cache.accept(&old, Ok(names(&["from_old_call"])), &wanted),
            Completion::Discarded
        );
        assert_eq!(cache.lookup(&tables(1)), Lookup::Pending);
        assert_eq!(
            cache.accept(&new, Ok(names(&["orders"])), &wanted),
            Completion::Applied
        );
    }

    #[test]
    fn test_unwanted_key_is_discarded() {
        let mut cache = MetadataCache::new();
        let wanted: BTreeSet<_> = [tables(1)].into_iter().collect();
        let request = cache.issue(&wanted).pop().unwrap();

        let now_wanted: BTreeSet<_> = [tables(2)].into_iter().collect();
        assert_eq!(
            cache.accept(&request, Ok(names(&["orders"])), &now_wanted),
            Completion::Discarded
        );
        assert_eq!(cache.lookup(&tables(1)), Lookup::Pending);
    }

    #[test]
    fn test_failure_is_cached_until_invalidated() {
        let mut cache = MetadataCache::new();
        let wanted: BTreeSet<_> = [tables(3)].into_iter().collect();
        let request = cache.issue(&wanted).pop().unwrap();

        let completion = cache.accept(
            &request,
            Err(MetadataError::Unavailable("timeout".into())),
            &wanted,
        );
        assert!(matches!(completion, Completion::Failed(ref r) if r.contains("timeout")));
        assert!(matches!(cache.lookup(&tables(3)), Lookup::Unavailable(_)));
        assert!(cache.issue(&wanted).is_empty());

        cache.invalidate(&tables(3));
        assert_eq!(cache.issue(&wanted).len(), 1);
    }

    #[test]
    fn test_forget_failure_only_touches_failed_keys() {
        let mut cache = MetadataCache::new();
        let wanted: BTreeSet<_> = [tables(1), tables(2)].into_iter().collect();
        let requests = cache.issue(&wanted);

        cache.accept(&requests[0], Ok(names(&["orders"])), &wanted);
        cache.accept(
            &requests[1],
            Err(MetadataError::Unavailable("refused".into())),
            &wanted,
        );

        assert!(!cache.forget_failure(&tables(1)));
        assert!(cache.forget_failure(&tables(2)));
        assert!(!cache.forget_failure(&tables(2)));

        let retried = cache.issue(&wanted);
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].key, tables(2));
        assert_eq!(cache.get(&tables(1)), Some(&names(&["orders"])));
    }
}
