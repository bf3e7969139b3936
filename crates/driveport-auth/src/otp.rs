//! One-time code generation and verification helpers.
//!
//! The delivery channel (email) is outside this crate; these helpers only
//! produce codes, hash them for storage on the account row, and check
//! submissions against the stored hash.

use rand::RngExt;
use sha2::{Digest, Sha256};

/// Number of digits in a generated code.
const CODE_DIGITS: u32 = 6;

/// Generates a random zero-padded numeric code.
pub fn generate_code() -> String {
    let max = 10u32.pow(CODE_DIGITS);
    let code = rand::rng().random_range(0..max);
    format!("{code:0width$}", width = CODE_DIGITS as usize)
}

/// Hashes a code for storage.
pub fn hash_code(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    format!("{digest:x}")
}

/// Verifies a submitted code against a stored hash.
pub fn verify_code(submitted: &str, stored_hash: &str) -> bool {
    hash_code(submitted.trim()) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_verify_round_trip() {
        let code = generate_code();
        let hash = hash_code(&code);
        assert!(verify_code(&code, &hash));
        assert!(verify_code(&format!(" {code} "), &hash));
        assert!(!verify_code("000001", &hash_code("999999")));
    }
}
