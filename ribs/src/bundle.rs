//! Persisted state for nodes.
//!
//! A [`Bundle`] is an ordered key/value store. Values are encoded with
//! bincode; bundles can nest so each node stores its children's state under
//! its own entry. The whole tree serializes to bytes for host persistence.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing a [`Bundle`].
#[derive(Debug, Clone, Error)]
pub enum BundleError {
    #[error("Failed to encode '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("Failed to decode '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("Entry '{0}' holds a different kind of value")]
    WrongKind(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum BundleValue {
    Text(String),
    Encoded(Vec<u8>),
    Bundle(Bundle),
    Bundles(Vec<Bundle>),
}

/// Key/value state store handed to and returned from nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    entries: BTreeMap<String, BundleValue>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Store any serializable value.
    pub fn put<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), BundleError> {
        let key = key.into();
        let bytes = bincode::serialize(value).map_err(|e| BundleError::Encode {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.entries.insert(key, BundleValue::Encoded(bytes));
        Ok(())
    }

    /// Read a value stored with [`put`](Self::put).
    ///
    /// Returns `Ok(None)` if the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BundleError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(BundleValue::Encoded(bytes)) => bincode::deserialize(bytes)
                .map(Some)
                .map_err(|e| BundleError::Decode {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            Some(_) => Err(BundleError::WrongKind(key.to_string())),
        }
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), BundleValue::Text(value.into()));
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(BundleValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn put_bundle(&mut self, key: impl Into<String>, bundle: Bundle) {
        self.entries.insert(key.into(), BundleValue::Bundle(bundle));
    }

    pub fn get_bundle(&self, key: &str) -> Option<&Bundle> {
        match self.entries.get(key) {
            Some(BundleValue::Bundle(bundle)) => Some(bundle),
            _ => None,
        }
    }

    pub fn put_bundles(&mut self, key: impl Into<String>, bundles: Vec<Bundle>) {
        self.entries.insert(key.into(), BundleValue::Bundles(bundles));
    }

    pub fn get_bundles(&self, key: &str) -> Option<&[Bundle]> {
        match self.entries.get(key) {
            Some(BundleValue::Bundles(bundles)) => Some(bundles),
            _ => None,
        }
    }

    /// Encode the bundle (and everything nested in it).
    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        bincode::serialize(self).map_err(|e| BundleError::Encode {
            key: "<bundle>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        bincode::deserialize(bytes).map_err(|e| BundleError::Decode {
            key: "<bundle>".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Score {
        player: String,
        points: u32,
    }

    #[test]
    fn test_typed_values() {
        let mut bundle = Bundle::new();
        let score = Score {
            player: "alice".into(),
            points: 3,
        };
        bundle.put("score", &score).unwrap();

        assert_eq!(bundle.get::<Score>("score").unwrap(), Some(score));
        assert_eq!(bundle.get::<Score>("missing").unwrap(), None);
    }

    #[test]
    fn test_wrong_kind() {
        let mut bundle = Bundle::new();
        bundle.put_string("name", "root");
        assert!(matches!(
            bundle.get::<u32>("name"),
            Err(BundleError::WrongKind(_))
        ));
        assert!(bundle.get_bundle("name").is_none());
    }

    #[test]
    fn test_nested_bundles_survive_bytes() {
        let mut child = Bundle::new();
        child.put("count", &7u32).unwrap();

        let mut parent = Bundle::new();
        parent.put_string("tag", "parent");
        parent.put_bundle("child", child.clone());
        parent.put_bundles("stack", vec![child.clone(), Bundle::new()]);

        let restored = Bundle::from_bytes(&parent.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, parent);
        assert_eq!(restored.get_bundle("child"), Some(&child));
        assert_eq!(restored.get_bundles("stack").map(<[Bundle]>::len), Some(2));
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(Bundle::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
