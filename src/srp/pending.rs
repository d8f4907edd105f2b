//! In-memory pending-registration store.
//!
//! One entry per identity, created when registration is requested and holding
//! the one-time code the caller must echo back. Re-requesting replaces the
//! code and restarts the expiry window. Entries never outlive the TTL: reads
//! drop expired entries and inserts purge opportunistically.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::Mutex;

use super::clock::Clock;

/// Digits in a one-time code.
const OTP_DIGITS: u32 = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpError {
    /// No pending request exists for the identity.
    #[error("no pending registration request")]
    NoPendingRequest,
    /// The code does not match; the pending request stays valid.
    #[error("one-time code does not match")]
    InvalidOtp,
    /// The code aged out; the pending request is gone.
    #[error("one-time code has expired")]
    OtpExpired,
    /// The OS refused randomness.
    #[error("failed to generate one-time code")]
    Generation,
}

struct PendingEntry {
    code: String,
    issued_at: Instant,
}

/// Pending registrations keyed by normalized identity.
pub struct PendingRegistrations {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingRegistrations {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh code for `identity`, replacing any outstanding one and
    /// restarting its expiry window. Returns the code for delivery.
    pub async fn issue(&self, identity: &str) -> Result<String, OtpError> {
        let mut raw = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut raw)
            .map_err(|_| OtpError::Generation)?;
        let code = format!(
            "{:0width$}",
            u32::from_be_bytes(raw) % 10u32.pow(OTP_DIGITS),
            width = OTP_DIGITS as usize
        );

        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| now.duration_since(entry.issued_at) < self.ttl);
        entries.insert(
            identity.to_string(),
            PendingEntry {
                code: code.clone(),
                issued_at: now,
            },
        );
        Ok(code)
    }

    /// Check `code` against the pending request for `identity` without
    /// consuming it. Expired entries are removed here; a mismatched code
    /// leaves the entry in place so the caller may retry.
    pub async fn check(&self, identity: &str, code: &str) -> Result<(), OtpError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(identity) else {
            return Err(OtpError::NoPendingRequest);
        };
        let expired = now.duration_since(entry.issued_at) >= self.ttl;
        let matches = bool::from(entry.code.as_bytes().ct_eq(code.as_bytes()));
        if expired {
            entries.remove(identity);
            return Err(OtpError::OtpExpired);
        }
        if matches {
            Ok(())
        } else {
            Err(OtpError::InvalidOtp)
        }
    }

    /// Drop the pending request for `identity`, if any.
    pub async fn remove(&self, identity: &str) {
        self.entries.lock().await.remove(identity);
    }

    /// Whether a live pending request exists for `identity`.
    pub async fn contains(&self, identity: &str) -> bool {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        entries
            .get(identity)
            .is_some_and(|entry| now.duration_since(entry.issued_at) < self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srp::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(300);

    fn store() -> (PendingRegistrations, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = PendingRegistrations::new(TTL, clock.clone());
        (store, clock)
    }

    #[tokio::test]
    async fn issued_code_checks_out() {
        let (store, _clock) = store();
        let code = store.issue("a@x.com").await.unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(store.check("a@x.com", &code).await, Ok(()));
    }

    #[tokio::test]
    async fn wrong_code_keeps_the_request() {
        let (store, _clock) = store();
        let code = store.issue("a@x.com").await.unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert_eq!(store.check("a@x.com", wrong).await, Err(OtpError::InvalidOtp));
        assert_eq!(store.check("a@x.com", &code).await, Ok(()));
    }

    #[tokio::test]
    async fn unknown_identity_has_no_pending_request() {
        let (store, _clock) = store();
        assert_eq!(
            store.check("nobody@x.com", "123456").await,
            Err(OtpError::NoPendingRequest)
        );
    }

    #[tokio::test]
    async fn expired_code_is_removed_on_check() {
        let (store, clock) = store();
        let code = store.issue("a@x.com").await.unwrap();

        clock.advance(TTL);
        assert_eq!(store.check("a@x.com", &code).await, Err(OtpError::OtpExpired));
        // The entry is gone, not merely stale.
        assert_eq!(
            store.check("a@x.com", &code).await,
            Err(OtpError::NoPendingRequest)
        );
    }

    #[tokio::test]
    async fn reissue_replaces_code_and_restarts_expiry() {
        let (store, clock) = store();
        let first = store.issue("a@x.com").await.unwrap();

        clock.advance(TTL - Duration::from_secs(1));
        let second = store.issue("a@x.com").await.unwrap();

        clock.advance(Duration::from_secs(2));
        if first != second {
            assert_eq!(
                store.check("a@x.com", &first).await,
                Err(OtpError::InvalidOtp)
            );
        }
        assert_eq!(store.check("a@x.com", &second).await, Ok(()));
    }

    #[tokio::test]
    async fn remove_drops_the_request() {
        let (store, _clock) = store();
        let code = store.issue("a@x.com").await.unwrap();
        store.remove("a@x.com").await;
        assert_eq!(
            store.check("a@x.com", &code).await,
            Err(OtpError::NoPendingRequest)
        );
    }
}
