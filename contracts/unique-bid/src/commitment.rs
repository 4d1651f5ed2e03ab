//! Sealed-bid commitments.
//!
//! A commitment is `sha256(number_be_bytes || salt)`, a 36-byte preimage.
//! Binding comes from SHA-256; hiding comes entirely from the salt, since the
//! number space is only `[1, max_number]`. Callers must draw the salt from a
//! strong random source.

use soroban_sdk::{Bytes, BytesN, Env};

/// Hash `(number, salt)` into the commitment submitted to `commit`.
pub fn compute_commitment(env: &Env, number: u32, salt: &BytesN<32>) -> BytesN<32> {
    let mut preimage = [0u8; 36];
    preimage[..4].copy_from_slice(&number.to_be_bytes());
    preimage[4..].copy_from_slice(&salt.to_array());

    env.crypto()
        .sha256(&Bytes::from_slice(env, &preimage))
        .into()
}

pub fn matches(env: &Env, stored: &BytesN<32>, number: u32, salt: &BytesN<32>) -> bool {
    &compute_commitment(env, number, salt) == stored
}

/// The all-zero hash stands for "no commitment" and is never accepted.
pub fn is_empty(hash: &BytesN<32>) -> bool {
    hash.to_array() == [0u8; 32]
}

#[cfg(test)]
mod test {
    use super::*;

    fn salt(env: &Env, byte: u8) -> BytesN<32> {
        BytesN::from_array(env, &[byte; 32])
    }

    #[test]
    fn test_commitment_binds_number_and_salt() {
        let env = Env::default();
        let stored = compute_commitment(&env, 7, &salt(&env, 1));

        assert!(matches(&env, &stored, 7, &salt(&env, 1)));
        assert!(!matches(&env, &stored, 8, &salt(&env, 1)));
        assert!(!matches(&env, &stored, 7, &salt(&env, 2)));
    }

    #[test]
    fn test_preimage_layout() {
        let env = Env::default();
        let s = salt(&env, 0xAB);

        let mut preimage = [0xABu8; 36];
        preimage[..4].copy_from_slice(&300u32.to_be_bytes());
        let expected: BytesN<32> = env
            .crypto()
            .sha256(&Bytes::from_slice(&env, &preimage))
            .into();

        assert_eq!(compute_commitment(&env, 300, &s), expected);
    }

    #[test]
    fn test_zero_hash_is_empty() {
        let env = Env::default();
        assert!(is_empty(&BytesN::from_array(&env, &[0u8; 32])));
        assert!(!is_empty(&compute_commitment(&env, 1, &salt(&env, 0))));
    }
}
