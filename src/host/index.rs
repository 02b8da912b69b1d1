use std::collections::HashMap;

use parking_lot::RwLock;

/// Process-lifetime cache from source file to component path.
///
/// Hosts extend it as components finish loading. Files that were never
/// registered resolve to the file string itself, so rules keyed by
/// component path simply never apply to them.
#[derive(Debug, Default)]
pub struct ComponentIndex {
    by_file: RwLock<HashMap<String, String>>,
}

impl ComponentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, component_path: impl Into<String>, file: impl Into<String>) {
        self.by_file
            .write()
            .insert(file.into(), component_path.into());
    }

    /// Register `(component_path, file)` pairs not yet known.
    pub fn extend<I, C, F>(&self, components: I)
    where
        I: IntoIterator<Item = (C, F)>,
        C: Into<String>,
        F: Into<String>,
    {
        let mut by_file = self.by_file.write();
        for (component, file) in components {
            by_file.entry(file.into()).or_insert_with(|| component.into());
        }
    }

    pub fn resolve(&self, file: &str) -> String {
        self.by_file
            .read()
            .get(file)
            .cloned()
            .unwrap_or_else(|| file.to_string())
    }

    pub fn contains(&self, file: &str) -> bool {
        self.by_file.read().contains_key(file)
    }

    pub fn len(&self) -> usize {
        self.by_file.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.read().is_empty()
    }
}
