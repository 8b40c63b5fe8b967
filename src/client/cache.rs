use crate::api::schemas::messaging::{Conversation, Message};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identifies one cached query result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Conversations,
    /// Thread with the given counterpart
    Thread(Uuid),
    UnreadCount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryData {
    Conversations(Vec<Conversation>),
    Thread(Vec<Message>),
    UnreadCount(u64),
}

#[derive(Clone, Debug)]
struct Entry {
    data: QueryData,
    fetched_at: Instant,
}

/// Latest server response per query. Entries older than `stale_after` are still
/// returned by [`QueryCache::get`] but are not considered fresh.
///
/// Each key carries a generation that moves on every invalidation. A fetch
/// records the generation it started under and its result is only stored by
/// [`QueryCache::put_fetched`] if no invalidation happened in between.
#[derive(Debug)]
pub struct QueryCache {
    entries: DashMap<QueryKey, Entry>,
    generations: DashMap<QueryKey, u64>,
    stale_after: Duration,
}

impl QueryCache {
    #[must_use]
    pub fn new(stale_after: Duration) -> Self {
        Self { entries: DashMap::new(), generations: DashMap::new(), stale_after }
    }

    /// Current generation of `key`, registering it so a later [`QueryCache::clear`] moves it too.
    #[must_use]
    pub fn generation(&self, key: QueryKey) -> u64 {
        *self.generations.entry(key).or_insert(0)
    }

    #[must_use]
    pub fn get(&self, key: QueryKey) -> Option<QueryData> {
        self.entries.get(&key).map(|entry| entry.data.clone())
    }

    /// Returns the cached data only if it was fetched within the staleness window.
    #[must_use]
    pub fn fresh(&self, key: QueryKey) -> Option<QueryData> {
        self.entries.get(&key).filter(|entry| entry.fetched_at.elapsed() < self.stale_after).map(|e| e.data.clone())
    }

    pub fn put(&self, key: QueryKey, data: QueryData) {
        self.entries.insert(key, Entry { data, fetched_at: Instant::now() });
    }

    /// Stores a fetch result unless `key` was invalidated since `generation`
    /// was read. Returns whether the data was stored.
    pub fn put_fetched(&self, key: QueryKey, generation: u64, data: QueryData) -> bool {
        // Generation stays locked until the entry is written.
        let current = self.generations.entry(key).or_insert(0);
        if *current != generation {
            return false;
        }
        self.entries.insert(key, Entry { data, fetched_at: Instant::now() });
        true
    }

    pub fn invalidate(&self, key: QueryKey) {
        *self.generations.entry(key).or_insert(0) += 1;
        self.entries.remove(&key);
    }

    pub fn clear(&self) {
        self.generations.iter_mut().for_each(|mut g| *g += 1);
        self.entries.clear();
    }
}
