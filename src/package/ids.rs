//! Identifier generation.
//!
//! Package and resource ids only need to be unique within a target; they
//! are persisted in manifests and sidecars and reused on later runs, so a
//! generator is consulted only for assets that have never been exported.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of package and resource ids.
pub const ID_LENGTH: usize = 8;

/// Source of fresh identifiers.
pub trait IdGenerator {
    /// A package or resource id: [`ID_LENGTH`] lowercase alphanumerics.
    fn next_id(&mut self) -> String;

    /// A 32-digit lowercase hex guid.
    fn next_guid(&mut self) -> String;
}

/// Random identifiers.
#[derive(Debug, Clone)]
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }

    fn next_guid(&mut self) -> String {
        format!("{:032x}", self.rng.gen::<u128>())
    }
}

/// Counting identifiers, for tests and reproducible output.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        format!("id{:06}", self.bump())
    }

    fn next_guid(&mut self) -> String {
        format!("{:032x}", self.bump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_shape() {
        let mut ids = RandomIds::seeded(7);
        let id = ids.next_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));

        let guid = ids.next_guid();
        assert_eq!(guid.len(), 32);
        assert!(guid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomIds::seeded(42);
        let mut b = RandomIds::seeded(42);
        assert_eq!(a.next_id(), b.next_id());
        assert_eq!(a.next_guid(), b.next_guid());
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "id000001");
        assert_eq!(ids.next_guid(), "00000000000000000000000000000002");
        assert_eq!(ids.next_id().len(), ID_LENGTH);
    }
}
