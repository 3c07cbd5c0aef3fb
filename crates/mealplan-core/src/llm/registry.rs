//! Generator registry -- named collection of configured providers.
//!
//! The pipeline builder looks providers up by name when wiring each stage
//! (e.g. `metrics = "openai"` in the stage mapping).

use std::collections::HashMap;
use std::sync::Arc;

use super::trait_def::TextGenerator;

/// A collection of registered [`TextGenerator`] implementations, keyed by name.
#[derive(Default, Clone)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Arc<dyn TextGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator under the name returned by [`TextGenerator::name`].
    ///
    /// Replaces and returns any generator previously registered under that name.
    pub fn register(
        &mut self,
        generator: impl TextGenerator + 'static,
    ) -> Option<Arc<dyn TextGenerator>> {
        self.register_arc(Arc::new(generator))
    }

    /// Register an already shared generator.
    pub fn register_arc(
        &mut self,
        generator: Arc<dyn TextGenerator>,
    ) -> Option<Arc<dyn TextGenerator>> {
        let name = generator.name().to_string();
        self.generators.insert(name, generator)
    }

    /// Look up a generator by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextGenerator>> {
        self.generators.get(name).cloned()
    }

    /// Names of all registered generators, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.list())
            .finish()
    }
}
