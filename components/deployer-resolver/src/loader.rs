use std::collections::HashMap;

use crate::errors::LoadError;

/// Resolves a contract location to its raw source.
pub trait SourceLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

impl<T: SourceLoader + ?Sized> SourceLoader for &T {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        (**self).load(location)
    }
}

impl<T: SourceLoader + ?Sized> SourceLoader for Box<T> {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        (**self).load(location)
    }
}

/// Serves sources from memory, keyed by location.
#[derive(Debug, Default, Clone)]
pub struct InMemorySourceLoader {
    sources: HashMap<String, Vec<u8>>,
}

impl InMemorySourceLoader {
    pub fn new() -> InMemorySourceLoader {
        InMemorySourceLoader::default()
    }

    pub fn insert(&mut self, location: &str, source: &str) {
        self.sources
            .insert(location.to_string(), source.as_bytes().to_vec());
    }

    pub fn with_source(mut self, location: &str, source: &str) -> InMemorySourceLoader {
        self.insert(location, source);
        self
    }
}

impl SourceLoader for InMemorySourceLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        self.sources
            .get(location)
            .cloned()
            .ok_or_else(|| LoadError::new(location, "no source registered for this location"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_loader_serves_known_locations() {
        let loader = InMemorySourceLoader::new().with_source("./A.cdc", "pub contract A {}");
        assert_eq!(loader.load("./A.cdc").unwrap(), b"pub contract A {}".to_vec());

        let err = loader.load("./B.cdc").unwrap_err();
        assert_eq!(err.location, "./B.cdc");
    }
}
