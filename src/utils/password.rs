use sha2::{Digest, Sha256};

/// Hashes a password salted with the owner's id.
///
/// The digest input is the plaintext followed by the decimal id, so two
/// users sharing a password never share a stored hash. The id must be
/// allocated before this is called.
pub fn hash_password(password: &str, user_id: i64) -> String {
    sha256_hex(&format!("{}{}", password, user_id))
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}
