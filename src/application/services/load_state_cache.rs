use std::collections::HashSet;
use std::sync::RwLock;

/// Remembers which collections were loaded during this process lifetime so search does
/// not issue a load call every time. Entries are never refreshed from the store; they are
/// dropped only by `invalidate` (on collection drop) or `clear`.
#[derive(Debug, Default)]
pub struct LoadStateCache {
    loaded: RwLock<HashSet<String>>,
}

impl LoadStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, collection: &str) -> bool {
        self.loaded
            .read()
            .map(|loaded| loaded.contains(collection))
            .unwrap_or(false)
    }

    pub fn mark_loaded(&self, collection: &str) {
        if let Ok(mut loaded) = self.loaded.write() {
            loaded.insert(collection.to_string());
        }
    }

    pub fn invalidate(&self, collection: &str) {
        if let Ok(mut loaded) = self.loaded.write() {
            loaded.remove(collection);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut loaded) = self.loaded.write() {
            loaded.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let cache = LoadStateCache::new();
        assert!(!cache.is_loaded("schema_vectors"));

        cache.mark_loaded("schema_vectors");
        cache.mark_loaded("sql_examples");
        assert!(cache.is_loaded("schema_vectors"));

        cache.invalidate("schema_vectors");
        assert!(!cache.is_loaded("schema_vectors"));
        assert!(cache.is_loaded("sql_examples"));

        cache.clear();
        assert!(!cache.is_loaded("sql_examples"));
    }
}
