// Shared store of embedded image assets, keyed by logical name (`<sha256>.<ext>`).
use crate::core::checksum_utils;
use std::collections::BTreeMap;

pub const PICTURES_PREFIX: &str = "Pictures/";

#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    items: BTreeMap<String, Vec<u8>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, bytes: Vec<u8>) {
        log::trace!("ImageStore: Storing '{}' ({} bytes)", name, bytes.len());
        self.items.insert(name.to_string(), bytes);
    }

    // Stores `bytes` under their content hash and returns the logical name.
    pub fn add_bytes(&mut self, bytes: Vec<u8>, extension: &str) -> String {
        let name = checksum_utils::asset_name_for(&bytes, extension);
        self.add(&name, bytes);
        name
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.items.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn container_path(name: &str) -> String {
    format!("{PICTURES_PREFIX}{name}")
}

pub fn logical_name(container_path: &str) -> &str {
    container_path
        .strip_prefix(PICTURES_PREFIX)
        .unwrap_or(container_path)
}
