use std::collections::{HashMap, VecDeque};

/// Cache key: exact (source, target, normalized text) triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub target: String,
    pub text: String,
}

impl CacheKey {
    pub fn new(source: &str, target: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedTranslation {
    pub text: String,
    /// Backend that originally produced this translation.
    pub backend: String,
}

/// Bounded in-process LRU cache for translation results. Only successful
/// non-empty translations are stored; the oldest entry is evicted on
/// overflow. Owned by the dispatcher behind a mutex.
pub struct TranslationCache {
    capacity: usize,
    map: HashMap<CacheKey, CachedTranslation>,
    order: VecDeque<CacheKey>,
}

pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<CachedTranslation> {
        let hit = self.map.get(key).cloned()?;
        self.touch(key);
        Some(hit)
    }

    pub fn insert(&mut self, key: CacheKey, value: CachedTranslation) {
        if self.map.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.map.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).expect("position in bounds");
            self.order.push_back(k);
        }
    }
}
