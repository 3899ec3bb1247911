//! Request codes for results delivered from outside the tree.
//!
//! A 16-bit code packs a group id (one per interactor tag) in the high bits
//! and a caller-chosen request id in the low bits. The host hands the code
//! back with the result and the tree routes it to the interactor that
//! generated it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::error::RibError;

const CODE_SPACE: u32 = 0x1_0000;
const KEY_LAYOUT: &str = "layout";
const KEY_GROUPS: &str = "groups";

/// Split between group bits and request-id bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCodeLayout {
    id_bits: u8,
}

impl RequestCodeLayout {
    pub const MAX_ID_BITS: u8 = 4;

    pub fn new(id_bits: u8) -> Result<Self, RibError> {
        if (1..=Self::MAX_ID_BITS).contains(&id_bits) {
            Ok(Self { id_bits })
        } else {
            Err(RibError::RequestCode(format!(
                "id bits must be between 1 and {}, got {id_bits}",
                Self::MAX_ID_BITS
            )))
        }
    }

    pub fn id_bits(self) -> u8 {
        self.id_bits
    }

    pub fn id_mask(self) -> u16 {
        (1u16 << self.id_bits) - 1
    }

    pub fn group_mask(self) -> u16 {
        !self.id_mask()
    }

    /// Largest request id a caller may use.
    pub fn max_id(self) -> u16 {
        self.id_mask()
    }
}

impl Default for RequestCodeLayout {
    fn default() -> Self {
        Self {
            id_bits: Self::MAX_ID_BITS,
        }
    }
}

/// Allocates group ids and packs request codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestCodeRegistry {
    layout: RequestCodeLayout,
    groups: BTreeMap<u16, String>,
}

impl RequestCodeRegistry {
    pub fn new(layout: RequestCodeLayout) -> Self {
        Self {
            layout,
            groups: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> RequestCodeLayout {
        self.layout
    }

    /// Group id for `group`, allocating one on first use.
    ///
    /// Starts from a hash of the name and steps forward on collision.
    pub fn group_id(&mut self, group: &str) -> Result<u16, RibError> {
        let step = 1u32 << self.layout.id_bits;
        let mut slot =
            (string_hash(group).wrapping_shl(u32::from(self.layout.id_bits))) % CODE_SPACE;

        for _ in 0..(CODE_SPACE / step) {
            let code = slot as u16;
            match self.groups.get(&code) {
                Some(existing) if existing == group => return Ok(code),
                Some(_) => slot = (slot + step) % CODE_SPACE,
                None => {
                    self.groups.insert(code, group.to_string());
                    return Ok(code);
                }
            }
        }

        Err(RibError::RequestCode(format!(
            "no free group id left for '{group}'"
        )))
    }

    /// Pack `id` into a code owned by `group`.
    pub fn request_code(&mut self, group: &str, id: u16) -> Result<u16, RibError> {
        if id == 0 || id > self.layout.max_id() {
            return Err(RibError::RequestCode(format!(
                "request id {id} outside 1..={}",
                self.layout.max_id()
            )));
        }
        Ok(self.group_id(group)? | id)
    }

    pub fn resolve_group_id(&self, code: u16) -> u16 {
        code & self.layout.group_mask()
    }

    pub fn resolve_request_id(&self, code: u16) -> u16 {
        code & self.layout.id_mask()
    }

    /// Group that generated `code`, if known.
    pub fn group_name(&self, code: u16) -> Option<&str> {
        self.groups
            .get(&self.resolve_group_id(code))
            .map(String::as_str)
    }

    pub fn save(&self) -> Result<Bundle, RibError> {
        let mut bundle = Bundle::new();
        bundle.put(KEY_LAYOUT, &self.layout)?;
        bundle.put(KEY_GROUPS, &self.groups)?;
        Ok(bundle)
    }

    /// Rebuild a registry saved with [`save`](Self::save).
    ///
    /// Keeps `layout` if the saved layout differs, since codes packed under
    /// another layout cannot be resolved.
    pub fn restore(layout: RequestCodeLayout, bundle: &Bundle) -> Result<Self, RibError> {
        let saved_layout: Option<RequestCodeLayout> = bundle.get(KEY_LAYOUT)?;
        if saved_layout.is_some_and(|saved| saved != layout) {
            log::warn!("Discarding request codes saved with a different layout");
            return Ok(Self::new(layout));
        }
        let groups = bundle.get(KEY_GROUPS)?.unwrap_or_default();
        Ok(Self { layout, groups })
    }
}

/// Deterministic across runs and platforms, unlike `std`'s `RandomState`.
fn string_hash(value: &str) -> u32 {
    value
        .bytes()
        .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(u32::from(byte)))
}
