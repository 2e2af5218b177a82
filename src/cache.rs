//! Cache key fingerprints.
//!
//! Moka cache keys are SHA-256 digests of the caller-supplied text rather
//! than the raw text itself: prompts are unbounded and may contain
//! credentials or PII that should not sit in cache key sets or logs.

use sha2::{Digest, Sha256};

/// Fingerprint for the generated-content cache, scoped per provider.
pub fn content_cache_key(provider: &str, prompt: &str) -> String {
    fingerprint(&[provider, prompt])
}

/// Fingerprint for the agent tool-classification cache.
pub fn classification_cache_key(query: &str) -> String {
    fingerprint(&["classify", query])
}

fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        // Length-prefix separator so ("ab","c") != ("a","bc")
        hasher.update((part.len() as u64).to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_key() {
        assert_eq!(
            content_cache_key("Grok", "write an ad"),
            content_cache_key("Grok", "write an ad")
        );
    }

    #[test]
    fn provider_scopes_the_key() {
        assert_ne!(
            content_cache_key("Grok", "write an ad"),
            content_cache_key("Doodle", "write an ad")
        );
    }

    #[test]
    fn boundary_shifts_change_the_key() {
        assert_ne!(
            content_cache_key("Grokw", "rite an ad"),
            content_cache_key("Grok", "write an ad")
        );
    }

    #[test]
    fn keys_are_hex_sha256() {
        let key = classification_cache_key("what will sales be next month?");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
