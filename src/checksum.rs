//! Layout fingerprints for reflected property lists

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::property::Property;

/// SHA256 fingerprint of an ordered property layout
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Fingerprint the wire layout: order, names, external keys and types
    pub fn of_properties(properties: &[Property]) -> Self {
        let mut hasher = Sha256::new();
        for property in properties {
            hasher.update(property.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(property.external_name.as_bytes());
            hasher.update([0u8]);
            hasher.update(property.property_type.to_string().as_bytes());
            hasher.update([b'\n']);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a property list still has this layout
    pub fn verify_properties(&self, properties: &[Property]) -> bool {
        *self == Self::of_properties(properties)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
