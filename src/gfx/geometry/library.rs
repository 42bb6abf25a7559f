use super::GeometryData;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Builds each geometry once and hands out shared references.
///
/// Mirrored limbs ask for the same key and receive the same `Arc`, so left
/// and right sleeves share one vertex buffer worth of data.
#[derive(Debug)]
pub struct GeometryLibrary<K> {
    entries: HashMap<K, Arc<GeometryData>>,
    builds: usize,
}

impl<K: Eq + Hash> GeometryLibrary<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            builds: 0,
        }
    }

    /// Returns the cached geometry for `key`, running `build` only on a miss
    pub fn get_or_build<F>(&mut self, key: K, build: F) -> Arc<GeometryData>
    where
        F: FnOnce() -> GeometryData,
    {
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing);
        }
        let geometry = Arc::new(build());
        self.builds += 1;
        self.entries.insert(key, Arc::clone(&geometry));
        geometry
    }

    pub fn get(&self, key: &K) -> Option<Arc<GeometryData>> {
        self.entries.get(key).cloned()
    }

    /// Number of times a builder actually ran
    pub fn build_count(&self) -> usize {
        self.builds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Arc<GeometryData>)> {
        self.entries.iter()
    }
}

impl<K: Eq + Hash> Default for GeometryLibrary<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_box, generate_torus};

    #[test]
    fn test_builds_once_per_key() {
        let mut library = GeometryLibrary::new();
        let first = library.get_or_build("cuff", || generate_torus(0.43, 0.05, 8, 16));
        let second = library.get_or_build("cuff", || panic!("cached geometry rebuilt"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(library.build_count(), 1);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_distinct_keys_build_separately() {
        let mut library = GeometryLibrary::new();
        let a = library.get_or_build(1u8, || generate_box(1.0, 1.0, 1.0));
        let b = library.get_or_build(2u8, || generate_box(1.0, 1.0, 1.0));

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
        assert_eq!(library.build_count(), 2);
        assert!(library.get(&3).is_none());
    }
}
