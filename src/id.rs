//! File reference IDs.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt::Write;

const PREFIX: &str = "sf-";

/// Hex digits kept from the digest.
const ID_LEN: usize = 10;

/// Derive an ID for a file attached at `path` with modification time `last_modified`.
///
/// Attaching the same file twice still yields two IDs: the attach instant
/// and a random salt are mixed in.
pub fn generate_id(path: &str, last_modified: i64) -> String {
    let salt: u64 = rand::rng().random();
    let attached_at = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let digest = Sha256::new()
        .chain_update(path.as_bytes())
        .chain_update([0u8])
        .chain_update(last_modified.to_be_bytes())
        .chain_update(attached_at.to_be_bytes())
        .chain_update(salt.to_be_bytes())
        .finalize();

    let mut id = String::with_capacity(PREFIX.len() + ID_LEN);
    id.push_str(PREFIX);
    for byte in digest.iter().take(ID_LEN / 2) {
        let _ = write!(id, "{:02x}", byte);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        let id = generate_id("docs/context.png", 1_700_000_000);
        assert_eq!(id.len(), 13);
        assert!(id.starts_with("sf-"));
        assert!(id[3..].chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_same_file_attached_twice_gets_distinct_ids() {
        let first = generate_id("same.png", 1000);
        let second = generate_id("same.png", 1000);
        assert_ne!(first, second);
    }
}
