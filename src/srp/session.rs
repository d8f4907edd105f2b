//! In-memory SRP session store.
//!
//! One outstanding challenge per identity. Opening a challenge replaces any
//! prior one; verifying consumes the session before any check runs, so every
//! session answers exactly one proof and a replayed verify sees no challenge
//! at all. Byte vectors only, no crypto-library state between requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;

use super::clock::Clock;
use super::{generate_server_ephemeral, verify_client_proof, ProofOutcome, SrpError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// No open challenge for the identity; also the answer to a replay.
    #[error("no open challenge")]
    NoChallenge,
    /// The challenge aged out before the proof arrived.
    #[error("challenge has expired")]
    ChallengeExpired,
    /// The client public value is degenerate.
    #[error("invalid client public value")]
    InvalidClientPublic,
    /// The proof does not match; the challenge has been consumed either way.
    #[error("client proof does not match")]
    InvalidProof,
}

struct SrpSession {
    salt: Vec<u8>,
    verifier: Vec<u8>,
    server_public: Vec<u8>,
    server_private: Vec<u8>,
    created_at: Instant,
}

/// A freshly opened challenge, ready to send to the client.
pub struct OpenedChallenge {
    server_public: Vec<u8>,
}

impl OpenedChallenge {
    /// Server public value `B`.
    #[must_use]
    pub fn server_public(&self) -> &[u8] {
        &self.server_public
    }
}

/// Open SRP challenges keyed by normalized identity.
pub struct SrpSessionStore {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<String, SrpSession>>,
}

impl SrpSessionStore {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Challenge lifetime; surfaced to clients as a hint.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a challenge for `identity` with its stored credential, replacing
    /// any challenge already outstanding.
    pub async fn open(
        &self,
        identity: &str,
        salt: &[u8],
        verifier: &[u8],
    ) -> Result<OpenedChallenge, SrpError> {
        let ephemeral = generate_server_ephemeral(verifier)?;
        let server_public = ephemeral.public().to_vec();

        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, session| now.duration_since(session.created_at) < self.ttl);
        sessions.insert(
            identity.to_string(),
            SrpSession {
                salt: salt.to_vec(),
                verifier: verifier.to_vec(),
                server_public: server_public.clone(),
                server_private: ephemeral.private().to_vec(),
                created_at: now,
            },
        );

        Ok(OpenedChallenge { server_public })
    }

    /// Verify a client proof, consuming the challenge first. Returns the
    /// server proof on success; every path, success or not, leaves no
    /// challenge behind.
    pub async fn verify(
        &self,
        identity: &str,
        client_public: &[u8],
        client_proof: &[u8],
    ) -> Result<Vec<u8>, VerifyError> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions.remove(identity).ok_or(VerifyError::NoChallenge)?
        };

        if self.clock.now().duration_since(session.created_at) >= self.ttl {
            return Err(VerifyError::ChallengeExpired);
        }

        let outcome = verify_client_proof(
            identity,
            &session.salt,
            &session.verifier,
            client_public,
            &session.server_public,
            &session.server_private,
            client_proof,
        )
        .map_err(|err| match err {
            SrpError::InvalidClientPublic => VerifyError::InvalidClientPublic,
            SrpError::MalformedVerifier | SrpError::EphemeralGeneration => {
                VerifyError::InvalidProof
            }
        })?;

        match outcome {
            ProofOutcome::Verified { server_proof } => Ok(server_proof),
            ProofOutcome::Mismatch => Err(VerifyError::InvalidProof),
        }
    }
}
