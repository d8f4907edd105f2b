//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use super::{AuthConfig, AuthState};
use crate::srp::clock::SystemClock;
use crate::token::HmacTokenIssuer;

pub(crate) fn auth_state() -> Arc<AuthState> {
    let issuer = HmacTokenIssuer::new(
        SecretString::from("11".repeat(32)),
        Duration::from_secs(1800),
    )
    .expect("test signing key is valid");
    Arc::new(AuthState::new(
        AuthConfig::new(),
        Arc::new(SystemClock),
        Arc::new(issuer),
    ))
}
