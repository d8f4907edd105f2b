//! Auth state and configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::srp::clock::Clock;
use crate::srp::pending::PendingRegistrations;
use crate::srp::session::SrpSessionStore;
use crate::token::TokenIssuer;

const DEFAULT_OTP_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_SESSION_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 30 * 60;

#[derive(Clone, Copy, Debug)]
pub struct AuthConfig {
    otp_ttl_seconds: u64,
    session_ttl_seconds: u64,
    token_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: u64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> u64 {
        self.otp_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state for the auth handlers: the two in-memory stores plus the
/// token issuer.
pub struct AuthState {
    config: AuthConfig,
    pending: PendingRegistrations,
    sessions: SrpSessionStore,
    token_issuer: Arc<dyn TokenIssuer>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, clock: Arc<dyn Clock>, token_issuer: Arc<dyn TokenIssuer>) -> Self {
        let pending = PendingRegistrations::new(
            Duration::from_secs(config.otp_ttl_seconds()),
            clock.clone(),
        );
        let sessions = SrpSessionStore::new(
            Duration::from_secs(config.session_ttl_seconds()),
            clock,
        );
        Self {
            config,
            pending,
            sessions,
            token_issuer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn pending(&self) -> &PendingRegistrations {
        &self.pending
    }

    #[must_use]
    pub fn sessions(&self) -> &SrpSessionStore {
        &self.sessions
    }

    pub(super) fn token_issuer(&self) -> &dyn TokenIssuer {
        self.token_issuer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srp::clock::SystemClock;
    use crate::token::HmacTokenIssuer;
    use secrecy::SecretString;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();

        assert_eq!(config.otp_ttl_seconds(), super::DEFAULT_OTP_TTL_SECONDS);
        assert_eq!(
            config.session_ttl_seconds(),
            super::DEFAULT_SESSION_TTL_SECONDS
        );
        assert_eq!(config.token_ttl_seconds(), super::DEFAULT_TOKEN_TTL_SECONDS);

        let config = config
            .with_otp_ttl_seconds(60)
            .with_session_ttl_seconds(120)
            .with_token_ttl_seconds(900);

        assert_eq!(config.otp_ttl_seconds(), 60);
        assert_eq!(config.session_ttl_seconds(), 120);
        assert_eq!(config.token_ttl_seconds(), 900);
    }

    #[test]
    fn auth_state_wires_store_ttls_from_config() {
        let config = AuthConfig::new().with_session_ttl_seconds(42);
        let issuer = HmacTokenIssuer::new(
            SecretString::from("0".repeat(64)),
            Duration::from_secs(config.token_ttl_seconds()),
        )
        .unwrap();
        let state = AuthState::new(config, Arc::new(SystemClock), Arc::new(issuer));

        assert_eq!(state.sessions().ttl(), Duration::from_secs(42));
        assert_eq!(state.config().session_ttl_seconds(), 42);
    }
}
