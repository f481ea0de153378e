//! Context fingerprinting for suggestion re-fetch decisions.
//!
//! A stage only re-requests a suggestion when the upstream context it was
//! built from has changed. The fingerprint is a hash of the serialized
//! request, so any upstream edit that survives serialization triggers a
//! re-fetch and cosmetic no-ops do not.

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes a stable fingerprint of a serializable request context.
pub fn context_fingerprint<T: Serialize>(context: &T) -> Result<u64> {
    let bytes = serde_json::to_vec(context)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    // Convert first 8 bytes of SHA256 to u64.
    Ok(u64::from_le_bytes(digest[..8].try_into()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Context {
        problem: String,
        constraints: Vec<String>,
    }

    #[test]
    fn test_same_context_same_fingerprint() {
        let a = Context {
            problem: "overheating".to_string(),
            constraints: vec!["no new parts".to_string()],
        };
        let b = Context {
            problem: "overheating".to_string(),
            constraints: vec!["no new parts".to_string()],
        };
        assert_eq!(
            context_fingerprint(&a).unwrap(),
            context_fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn test_any_field_change_changes_fingerprint() {
        let a = Context {
            problem: "overheating".to_string(),
            constraints: vec![],
        };
        let b = Context {
            problem: "overcooling".to_string(),
            constraints: vec![],
        };
        assert_ne!(
            context_fingerprint(&a).unwrap(),
            context_fingerprint(&b).unwrap()
        );
    }
}
