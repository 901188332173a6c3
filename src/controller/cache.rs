//! Bounded cache of fetched pages, keyed by the full query key.

use std::collections::{HashMap, VecDeque};

use crate::core::{PageResult, QueryKey};

/// Per-controller page cache, evicting the least recently inserted key
pub struct PageCache {
    capacity: usize,
    pages: HashMap<QueryKey, PageResult>,
    order: VecDeque<QueryKey>,
}

impl PageCache {
    /// `capacity == 0` disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pages: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<PageResult> {
        self.pages.get(key).cloned()
    }

    pub fn insert(&mut self, key: QueryKey, page: PageResult) {
        if self.capacity == 0 {
            return;
        }

        if self.pages.insert(key.clone(), page).is_some() {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.pages.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FilterState;

    fn key(page: u32) -> QueryKey {
        FilterState::default().key(page, 20)
    }

    #[test]
    fn test_get_after_insert() {
        let mut cache = PageCache::new(4);
        cache.insert(key(1), PageResult::empty(1));
        assert_eq!(cache.get(&key(1)).map(|p| p.page), Some(1));
        assert!(cache.get(&key(2)).is_none());
    }

    #[test]
    fn test_evicts_oldest() {
        let mut cache = PageCache::new(2);
        cache.insert(key(1), PageResult::empty(1));
        cache.insert(key(2), PageResult::empty(2));
        cache.insert(key(3), PageResult::empty(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn test_reinsert_refreshes_position() {
        let mut cache = PageCache::new(2);
        cache.insert(key(1), PageResult::empty(1));
        cache.insert(key(2), PageResult::empty(2));
        cache.insert(key(1), PageResult::empty(1));
        cache.insert(key(3), PageResult::empty(3));

        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(2)).is_none());
    }

    #[test]
    fn test_zero_capacity_disabled() {
        let mut cache = PageCache::new(0);
        cache.insert(key(1), PageResult::empty(1));
        assert!(cache.is_empty());
    }
}
