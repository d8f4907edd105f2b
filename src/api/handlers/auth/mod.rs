//! Auth handlers and supporting modules.
//!
//! Registration is OTP-gated: requesting registration queues a one-time code
//! by email, and finalizing it stores the client-derived `{salt, verifier}`
//! pair. Login is an SRP-6a exchange: opening a challenge hands out `B`, and
//! verifying the client proof returns the server proof plus a bearer token.
//!
//! Passwords never reach this service in any form. The only secret material
//! held server-side is the verifier, and nothing secret-bearing is logged.

pub(crate) mod login;
pub(crate) mod register;
mod state;
mod storage;
pub(crate) mod types;
mod utils;

pub use state::{AuthConfig, AuthState};

#[cfg(test)]
pub(crate) mod test_support;
