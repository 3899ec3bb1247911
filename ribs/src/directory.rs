//! Customisation directory.
//!
//! Host-supplied knobs that builders and interactors read while a tree is
//! assembled. Every node sees the sub-directory named after its rib, which
//! falls back to the enclosing directories for keys it does not define.

use std::collections::BTreeMap;
use std::sync::Arc;

/// A single customisation value.
#[derive(Debug, Clone, PartialEq)]
pub enum Customisation {
    Flag(bool),
    Number(i64),
    Text(String),
    Directory(CustomisationDirectory),
}

impl From<bool> for Customisation {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for Customisation {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Customisation {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Customisation {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<CustomisationDirectory> for Customisation {
    fn from(value: CustomisationDirectory) -> Self {
        Self::Directory(value)
    }
}

/// String-keyed customisation values with parent fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomisationDirectory {
    entries: BTreeMap<String, Customisation>,
    parent: Option<Arc<CustomisationDirectory>>,
}

impl CustomisationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Customisation>) -> Self {
        self.put(key, value);
        self
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Customisation>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a key here, then in each enclosing directory.
    pub fn get(&self, key: &str) -> Option<&Customisation> {
        self.entries
            .get(key)
            .or_else(|| self.parent.as_deref().and_then(|parent| parent.get(key)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Customisation::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Customisation::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Customisation::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        self.flag(key).unwrap_or(default)
    }

    pub fn number_or(&self, key: &str, default: i64) -> i64 {
        self.number(key).unwrap_or(default)
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    /// Directory scoped to `name`.
    ///
    /// Uses the nested directory stored under `name` here or in an
    /// enclosing directory, otherwise an empty scope. Either way lookups
    /// fall back to `self`.
    pub fn sub_directory(&self, name: &str) -> CustomisationDirectory {
        let entries = match self.get(name) {
            Some(Customisation::Directory(nested)) => nested.entries.clone(),
            _ => BTreeMap::new(),
        };
        CustomisationDirectory {
            entries,
            parent: Some(Arc::new(self.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup() {
        let dir = CustomisationDirectory::new()
            .with("debug", true)
            .with("size", 3i64)
            .with("title", "Ribs");

        assert_eq!(dir.flag("debug"), Some(true));
        assert_eq!(dir.number("size"), Some(3));
        assert_eq!(dir.text("title"), Some("Ribs"));
        assert_eq!(dir.flag("size"), None);
        assert_eq!(dir.number_or("missing", 9), 9);
    }

    #[test]
    fn test_sub_directory_shadows_parent() {
        let game = CustomisationDirectory::new().with("size", 4i64);
        let root = CustomisationDirectory::new()
            .with("size", 3i64)
            .with("debug", true)
            .with("Game", game);

        let scoped = root.sub_directory("Game");
        assert_eq!(scoped.number("size"), Some(4));
        assert_eq!(scoped.flag("debug"), Some(true));

        let other = root.sub_directory("Other");
        assert_eq!(other.number("size"), Some(3));
    }

    #[test]
    fn test_nested_scopes_chain() {
        let inner = CustomisationDirectory::new().with("depth", 2i64);
        let outer = CustomisationDirectory::new()
            .with("depth", 1i64)
            .with("Inner", inner);
        let root = CustomisationDirectory::new()
            .with("name", "root")
            .with("Outer", outer);

        let scoped = root.sub_directory("Outer").sub_directory("Inner");
        assert_eq!(scoped.number("depth"), Some(2));
        assert_eq!(scoped.text("name"), Some("root"));
        assert_eq!(scoped.text_or("missing", "fallback"), "fallback");
    }
}
