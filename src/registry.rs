use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe multiset of extracted domains: domain -> occurrence count.
///
/// Keys are only ever added and counts only ever grow. Readers that need a
/// final answer must wait until every producer is done; nothing here closes
/// the registry for writes.
#[derive(Debug, Default)]
pub struct DomainRegistry {
    counts: Mutex<HashMap<String, u64>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single-entry update, so a panicking holder cannot
    // leave the map half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, domain: &str) {
        let mut counts = self.lock();
        match counts.get_mut(domain) {
            Some(count) => *count += 1,
            None => {
                counts.insert(domain.to_string(), 1);
            }
        }
    }

    /// Inserts a batch under one lock acquisition.
    pub fn insert_many<I>(&self, domains: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut counts = self.lock();
        for domain in domains {
            *counts.entry(domain).or_insert(0) += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the distinct domains and their counts.
    pub fn domains(&self) -> HashMap<String, u64> {
        self.lock().clone()
    }

    /// Distinct domains joined by single spaces, in no particular order.
    pub fn to_blocklist_string(&self) -> String {
        let counts = self.lock();
        let mut out = String::with_capacity(counts.keys().map(|d| d.len() + 1).sum());
        for domain in counts.keys() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(domain);
        }
        out
    }

    pub fn into_domains(self) -> HashMap<String, u64> {
        self.counts
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
