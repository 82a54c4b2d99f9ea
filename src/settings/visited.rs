use std::sync::Arc;

use super::storage::KeyValueStore;

const VISITED_KEY: &str = "graph-visited";

/// Slugs the user has navigated to, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitedSet {
    slugs: Vec<String>,
}

impl VisitedSet {
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        let raw = match storage.get(VISITED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                tracing::warn!("failed to read visited pages: {err:#}");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => {
                let mut visited = Self::default();
                for slug in list {
                    visited.insert(slug);
                }
                visited
            }
            Err(err) => {
                tracing::warn!("ignoring corrupt visited pages: {err}");
                Self::default()
            }
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.iter().any(|visited| visited == slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    fn insert(&mut self, slug: String) -> bool {
        if self.contains(&slug) {
            return false;
        }
        self.slugs.push(slug);
        true
    }

    /// Adds `slug` and persists the whole list.
    pub fn record(&mut self, storage: &Arc<dyn KeyValueStore>, slug: &str) {
        if !self.insert(slug.to_owned()) {
            return;
        }

        let result = serde_json::to_string(&self.slugs)
            .map_err(anyhow::Error::from)
            .and_then(|raw| storage.set(VISITED_KEY, &raw));
        if let Err(err) = result {
            tracing::warn!("failed to persist visited pages: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    #[test]
    fn records_are_appended_once_and_persisted() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        let mut visited = VisitedSet::load(storage.as_ref());
        assert!(visited.is_empty());

        visited.record(&storage, "index");
        visited.record(&storage, "a");
        visited.record(&storage, "index");

        let reloaded = VisitedSet::load(storage.as_ref());
        assert_eq!(reloaded, visited);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("a"));
    }

    #[test]
    fn corrupt_state_reads_as_empty() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        storage.set(VISITED_KEY, "{not json").unwrap();
        let mut visited = VisitedSet::load(storage.as_ref());
        assert!(visited.is_empty());

        visited.record(&storage, "b");
        assert_eq!(
            storage.get(VISITED_KEY).unwrap().as_deref(),
            Some(r#"["b"]"#)
        );
    }
}
