//! Content fingerprints.

use std::fmt;

use serde::{Serialize, Serializer};

/// Number of hash bytes kept. Rendered as 32 hex characters.
const FINGERPRINT_LEN: usize = 16;

/// Identifies one derived artifact of one document state.
///
/// Computed from the document content, origin and timestamp plus a
/// derivation key such as `"ast"` or `"html"`. Not a security primitive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Computes the fingerprint of the given fields.
    ///
    /// Each field is length-prefixed, so moving bytes between fields
    /// always changes the result.
    pub fn compute(content: &str, origin: &str, timestamp: u64, key: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        update_field(&mut hasher, content.as_bytes());
        update_field(&mut hasher, origin.as_bytes());
        update_field(&mut hasher, &timestamp.to_le_bytes());
        update_field(&mut hasher, key.as_bytes());

        let hash = hasher.finalize();
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&hash.as_bytes()[..FINGERPRINT_LEN]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn update_field(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A document whose state can be fingerprinted.
///
/// Missing fields should be reported as empty (or zero); the fingerprint
/// is still computed from whatever is present.
pub trait FingerprintSource {
    fn content(&self) -> &str;
    fn origin(&self) -> &str;
    fn timestamp(&self) -> u64;
}

/// Fingerprints `source` for the artifact identified by `key`.
pub fn fingerprint<S: FingerprintSource + ?Sized>(source: &S, key: &str) -> Fingerprint {
    Fingerprint::compute(source.content(), source.origin(), source.timestamp(), key)
}
