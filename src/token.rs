//! Bearer token issuance.
//!
//! Tokens are `base64url(claims_json).base64url(hmac_sha256(claims_json))`,
//! signed with a key the process owns. The rest of the crate only sees the
//! [`TokenIssuer`] trait; handlers treat tokens as opaque strings.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signing keys are raw 32-byte values, hex encoded in configuration.
const KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    /// The signing key is not 64 hex characters.
    #[error("token signing key must be {} hex characters", KEY_LEN * 2)]
    InvalidKey,
    /// The token does not parse as `payload.signature`.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the payload.
    #[error("token signature does not match")]
    BadSignature,
    /// The token is past its expiry claim.
    #[error("token has expired")]
    Expired,
    /// The system clock reads before the Unix epoch.
    #[error("system time is before the Unix epoch")]
    Clock,
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user id.
    pub sub: Uuid,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Issues and verifies access tokens for authenticated users.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, subject: Uuid) -> Result<String, TokenError>;
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HMAC-SHA256 signed tokens with a fixed time-to-live.
pub struct HmacTokenIssuer {
    key: SecretString,
    ttl: Duration,
}

impl HmacTokenIssuer {
    /// Build an issuer from a hex-encoded 32-byte key.
    pub fn new(key: SecretString, ttl: Duration) -> Result<Self, TokenError> {
        match hex::decode(key.expose_secret()) {
            Ok(bytes) if bytes.len() == KEY_LEN => Ok(Self { key, ttl }),
            _ => Err(TokenError::InvalidKey),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        let key = hex::decode(self.key.expose_secret()).map_err(|_| TokenError::InvalidKey)?;
        HmacSha256::new_from_slice(&key).map_err(|_| TokenError::InvalidKey)
    }
}

fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| TokenError::Clock)
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        let iat = unix_now()?;
        let claims = Claims {
            sub: subject,
            iat,
            exp: iat + self.ttl.as_secs(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if unix_now()? >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
