//! Version → parser lookup.

use std::collections::BTreeMap;

use crate::parsers::{self, ParseFn};

/// Explicit table of template parsers, keyed by dotless version.
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, ParseFn>,
}

impl ParserRegistry {
    /// Registry with no parsers at all.
    pub fn empty() -> Self {
        Self {
            parsers: BTreeMap::new(),
        }
    }

    /// Add or replace the parser for `version`.
    pub fn register(&mut self, version: impl Into<String>, parser: ParseFn) -> &mut Self {
        self.parsers.insert(version.into(), parser);
        self
    }

    pub fn get(&self, version: &str) -> Option<ParseFn> {
        self.parsers.get(version).copied()
    }

    /// Registered versions, sorted.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ParserRegistry {
    /// Every template revision this crate knows.
    fn default() -> Self {
        let mut reg = Self::empty();
        reg.register("100", parsers::v100::parse)
            .register("230", parsers::v230::parse)
            // 2.4.0 predates the version stamp but shares the 2.4.1 layout.
            .register("240", parsers::v241::parse)
            .register("241", parsers::v241::parse)
            .register("255", parsers::v255::parse);
        reg
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.versions()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_known_templates() {
        let reg = ParserRegistry::default();
        let versions: Vec<&str> = reg.versions().collect();
        assert_eq!(versions, ["100", "230", "240", "241", "255"]);
        assert!(reg.get("250").is_none());
    }

    #[test]
    fn register_replaces() {
        let mut reg = ParserRegistry::empty();
        assert!(reg.is_empty());
        reg.register("999", parsers::v100::parse);
        reg.register("999", parsers::v255::parse);
        assert_eq!(reg.len(), 1);
        assert!(reg.get("999").is_some());
    }
}
