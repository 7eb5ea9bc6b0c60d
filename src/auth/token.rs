//! Self-issued session tokens.
//!
//! Wire format: `base64url(json(payload)) "." base64url(hmac_sha256(secret, first_part))`.
//! There is no version field; changing the format or the secret invalidates
//! every outstanding session.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::error::TokenError;
use crate::store::{Role, UserId};

type HmacSha256 = Hmac<Sha256>;

const FIELD_IDENTIFIER: &str = "identifier";
const FIELD_ROLE: &str = "role";
const FIELD_EXPIRES: &str = "expiresAtEpochMillis";

/// Claims carried by a session token.
///
/// Only serialized; incoming tokens are validated field by field during
/// verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub identifier: UserId,
    pub role: Role,
    pub expires_at_epoch_millis: i64,
}

impl TokenPayload {
    /// Payload for `identifier` that expires `ttl` from now.
    #[must_use]
    pub fn new(identifier: UserId, role: Role, ttl: Duration) -> Self {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            identifier,
            role,
            expires_at_epoch_millis: now_millis().saturating_add(ttl_millis),
        }
    }

    /// Strictly before expiry is valid; the expiry instant itself is not.
    #[must_use]
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at_epoch_millis
    }

    /// Validate an untyped JSON document into a payload.
    fn from_value(value: &Value) -> Result<Self, TokenError> {
        let object = value.as_object().ok_or(TokenError::Malformed)?;

        let identifier = object
            .get(FIELD_IDENTIFIER)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(TokenError::Malformed)?;

        let role = object
            .get(FIELD_ROLE)
            .and_then(Value::as_str)
            .and_then(|role| role.parse::<Role>().ok())
            .ok_or(TokenError::Malformed)?;

        // `as_i64` is `None` for floats, so `1.5e12` is rejected here.
        let expires_at_epoch_millis = object
            .get(FIELD_EXPIRES)
            .and_then(Value::as_i64)
            .ok_or(TokenError::Malformed)?;

        Ok(Self {
            identifier: UserId::from(identifier),
            role,
            expires_at_epoch_millis,
        })
    }
}

/// Current wall clock in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    i64::try_from(elapsed).unwrap_or(i64::MAX)
}

/// Holds the HMAC key used to sign and verify session tokens.
pub struct SessionKeys {
    secret: SecretString,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").field("secret", &"***").finish()
    }
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self, encoded_payload: &str) -> Result<HmacSha256, TokenError> {
        // HMAC accepts keys of any length, so this only fails on a broken backend.
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|err| TokenError::Encode(err.to_string()))?;
        mac.update(encoded_payload.as_bytes());
        Ok(mac)
    }

    /// Serialize and sign a payload.
    ///
    /// # Errors
    /// Returns `TokenError::Encode` if the payload cannot be serialized.
    pub fn sign(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        let json = serde_json::to_vec(payload).map_err(|err| TokenError::Encode(err.to_string()))?;
        let encoded_payload = Base64UrlUnpadded::encode_string(&json);
        let signature = self.mac(&encoded_payload)?.finalize().into_bytes();
        let encoded_signature = Base64UrlUnpadded::encode_string(&signature);
        Ok(format!("{encoded_payload}.{encoded_signature}"))
    }

    /// Verify a token against the system clock.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<TokenPayload> {
        self.verify_at(token, now_millis())
    }

    /// Verify a token as of `now_millis`.
    ///
    /// Every failure collapses to `None`; the reason is only logged.
    #[must_use]
    pub fn verify_at(&self, token: &str, now_millis: i64) -> Option<TokenPayload> {
        match self.check(token, now_millis) {
            Ok(payload) => Some(payload),
            Err(err) => {
                debug!(reason = %err, "rejected session token");
                None
            }
        }
    }

    fn check(&self, token: &str, now_millis: i64) -> Result<TokenPayload, TokenError> {
        let mut parts = token.split('.');
        let (Some(encoded_payload), Some(encoded_signature), None) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };
        if encoded_payload.is_empty() || encoded_signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(encoded_signature).map_err(|_| TokenError::Malformed)?;
        // Reject alternate spellings of the same bytes so the signature
        // segment has exactly one accepted form.
        if Base64UrlUnpadded::encode_string(&signature) != encoded_signature {
            return Err(TokenError::Malformed);
        }

        // `verify_slice` checks the length, then compares in constant time.
        self.mac(encoded_payload)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::SignatureMismatch)?;

        let json =
            Base64UrlUnpadded::decode_vec(encoded_payload).map_err(|_| TokenError::Malformed)?;
        let value: Value = serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;
        let payload = TokenPayload::from_value(&value)?;

        if payload.is_expired_at(now_millis) {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }
}
