//! Password hashing with Argon2id in raw mode.
//!
//! The store keeps two hex strings per account: the derived key and the salt
//! it was derived with. Verification re-derives and compares in constant time.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};

use super::error::CredentialError;

const SALT_LEN: usize = 16;
const DERIVED_KEY_LEN: usize = 64;

// Used only to burn one derivation when the account does not exist.
const DUMMY_SALT_HEX: &str = "00000000000000000000000000000000";

/// Hex-encoded derived key plus the hex salt it was derived with.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("hash", &"***")
            .field("salt", &self.salt)
            .finish()
    }
}

fn kdf() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        Params::DEFAULT_T_COST,
        Params::DEFAULT_P_COST,
        Some(DERIVED_KEY_LEN),
    )
    .map_err(|err| CredentialError::HashingFailure(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[cfg(test)]
thread_local! {
    static DERIVATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn derive(password: &str, salt: &[u8]) -> Result<[u8; DERIVED_KEY_LEN], CredentialError> {
    #[cfg(test)]
    DERIVATIONS.with(|count| count.set(count.get() + 1));

    let mut out = [0u8; DERIVED_KEY_LEN];
    kdf()?
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .map_err(|err| CredentialError::HashingFailure(err.to_string()))?;
    Ok(out)
}

/// Hash a password, generating a fresh random salt unless one is supplied.
///
/// # Errors
/// Returns `HashingFailure` if the supplied salt is not valid hex, is too short
/// for the KDF, or the OS RNG fails.
pub fn hash_password(password: &str, salt: Option<&str>) -> Result<PasswordHash, CredentialError> {
    let salt_bytes = match salt {
        Some(hex_salt) => hex::decode(hex_salt)
            .map_err(|err| CredentialError::HashingFailure(format!("invalid salt: {err}")))?,
        None => {
            let mut bytes = vec![0u8; SALT_LEN];
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|err| CredentialError::HashingFailure(err.to_string()))?;
            bytes
        }
    };

    let derived = derive(password, &salt_bytes)?;

    Ok(PasswordHash {
        hash: hex::encode(derived),
        salt: hex::encode(salt_bytes),
    })
}

/// Check a password against a stored hash and salt.
///
/// Fails closed: malformed salts or hashes yield `false`.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hash) else {
        return false;
    };
    let Ok(salt_bytes) = hex::decode(salt) else {
        return false;
    };
    match derive(password, &salt_bytes) {
        Ok(derived) => constant_time_eq(&derived, &expected),
        Err(_) => false,
    }
}

/// Run one derivation whose result is discarded.
///
/// Login calls this when the email is unknown so that path costs the same as
/// a wrong password.
pub fn dummy_verify(password: &str) {
    let _ = verify_password(password, DUMMY_SALT_HEX, "");
}

/// Compare two byte slices without short-circuiting on the first difference.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
