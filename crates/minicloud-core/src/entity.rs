//! Entity identity

use sha2::{Digest, Sha256};
use std::fmt;

const FINGERPRINT_MODULUS: u64 = 100_000_000;

/// Storage key derived from an entity name
///
/// The SHA-256 digest of the name, read as one big-endian integer, reduced
/// to 8 decimal digits.
pub fn fingerprint(name: &str) -> u64 {
    Sha256::digest(name.as_bytes())
        .iter()
        .fold(0u64, |acc, byte| (acc * 256 + u64::from(*byte)) % FINGERPRINT_MODULUS)
}

/// Identity-bearing record managed by exactly one manager
///
/// Two entities with the same name are the same logical resource.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Lower-case kind name ("cloud", "network", ...)
    const KIND: &'static str;

    fn name(&self) -> &str;

    fn fingerprint(&self) -> u64 {
        fingerprint(self.name())
    }

    /// Name of the owning entity, for child entities
    fn parent_name(&self) -> Option<&str> {
        None
    }

    fn is_child_of(&self, parent: &str) -> bool {
        self.parent_name() == Some(parent)
    }

    /// One-line label used in listings and topologies
    fn describe(&self) -> String {
        format!("{}: {}", title(Self::KIND), self.name())
    }

    /// Listing order; by name unless a kind knows better
    fn sort(entities: &mut [Self]) {
        entities.sort_by(|a, b| a.name().cmp(b.name()));
    }
}

/// "security_group" -> "Security Group"
pub fn title(kind: &str) -> String {
    kind.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sort by the index of the first matching class, then by name
pub(crate) fn sort_by_class<E: Entity>(entities: &mut [E], classes: &[fn(&str) -> bool]) {
    entities.sort_by_cached_key(|e| {
        let class = classes
            .iter()
            .position(|matches| matches(e.name()))
            .unwrap_or(classes.len());
        (class, e.name().to_string())
    });
}
