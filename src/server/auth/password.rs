//! Salted, iterated SHA-256 credential hashing.

use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const SALT_LEN: usize = 16;
const ROUNDS: u32 = 10_000;

pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

pub fn hash_password(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into();
    for _ in 1..ROUNDS {
        digest = Sha256::new()
            .chain_update(salt)
            .chain_update(digest)
            .finalize()
            .into();
    }
    digest
}

pub fn verify_password(password: &str, salt: &[u8], expected: &[u8]) -> bool {
    constant_time_eq(&hash_password(password, salt), expected)
}
