//! SRP-6a protocol engine and the short-lived state around it.
//!
//! The engine is a set of pure functions over the group in [`group`]: verifier
//! derivation and validation, server ephemeral generation, and client-proof
//! verification. It holds no state of its own; the challenge/verify bridge
//! lives in [`session::SrpSessionStore`] and the OTP-gated registration state
//! in [`pending::PendingRegistrations`].
//!
//! Conventions (shared with [`client`], which implements the other half):
//!
//! - `H` is SHA-256; scalars travel as trimmed big-endian bytes.
//! - `k = H(N | PAD(g))`, `u = H(PAD(A) | PAD(B))`
//! - `x = H(salt | H(identity ":" password))`, `v = g^x mod N`
//! - `B = (k*v + g^b) mod N`, `S = (A * v^u)^b mod N`, `K = H(S)`
//! - `M1 = H((H(N) xor H(g)) | H(identity) | salt | A | B | K)`
//! - `HAMK = H(A | M1 | K)`
//!
//! A wrong client proof is a routine outcome, reported as
//! [`ProofOutcome::Mismatch`] rather than an error; errors are reserved for
//! degenerate inputs and generation failures.

pub mod client;
pub mod clock;
pub mod group;
pub mod pending;
pub mod session;

use num_bigint::BigUint;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use group::{SrpGroup, G_2048};

/// Byte length of the random server scalar `b`.
const EPHEMERAL_SCALAR_LEN: usize = 32;

/// Attempts to draw a non-degenerate ephemeral before giving up.
const EPHEMERAL_MAX_ATTEMPTS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SrpError {
    /// Verifier bytes are empty, oversized for the group, or reduce to zero.
    #[error("malformed verifier for the configured group")]
    MalformedVerifier,
    /// Client public value reduces to zero mod `N`, or the derived scrambling
    /// parameter is zero; accepting either would fix the shared secret.
    #[error("degenerate client public value")]
    InvalidClientPublic,
    /// Randomness failed or every attempt produced a degenerate `B`.
    #[error("failed to generate server ephemeral")]
    EphemeralGeneration,
}

/// Result of checking a client proof: either the matching server proof or a
/// plain mismatch. A mismatch never carries the server proof.
#[derive(Debug)]
pub enum ProofOutcome {
    Verified { server_proof: Vec<u8> },
    Mismatch,
}

/// Server ephemeral keypair for one challenge.
pub struct ServerEphemeral {
    private: Vec<u8>,
    public: Vec<u8>,
}

impl ServerEphemeral {
    /// Secret scalar `b`; stays inside the session store.
    #[must_use]
    pub fn private(&self) -> &[u8] {
        &self.private
    }

    /// Public value `B`, sent to the client.
    #[must_use]
    pub fn public(&self) -> &[u8] {
        &self.public
    }
}

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// `k = H(N | PAD(g))`
fn compute_k(group: &SrpGroup) -> BigUint {
    let n_bytes = group.n().to_bytes_be();
    let g_padded = group.pad(&group.g().to_bytes_be());
    BigUint::from_bytes_be(&sha256(&[&n_bytes, &g_padded]))
}

/// `u = H(PAD(A) | PAD(B))`
fn compute_u(group: &SrpGroup, client_public: &[u8], server_public: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&sha256(&[&group.pad(client_public), &group.pad(server_public)]))
}

/// `x = H(salt | H(identity ":" password))`
fn compute_x(identity: &str, password: &str, salt: &[u8]) -> BigUint {
    let inner = sha256(&[identity.as_bytes(), b":", password.as_bytes()]);
    BigUint::from_bytes_be(&sha256(&[salt, &inner]))
}

/// `H(N) xor H(g)`, the group-binding prefix of `M1`.
fn group_hash_xor(group: &SrpGroup) -> [u8; 32] {
    let hn = sha256(&[&group.n().to_bytes_be()]);
    let hg = sha256(&[&group.g().to_bytes_be()]);
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = hn[i] ^ hg[i];
    }
    out
}

/// `M1 = H((H(N) xor H(g)) | H(identity) | salt | A | B | K)`
fn compute_m1(
    group: &SrpGroup,
    identity: &str,
    salt: &[u8],
    client_public: &[u8],
    server_public: &[u8],
    session_key: &[u8],
) -> [u8; 32] {
    let prefix = group_hash_xor(group);
    let identity_hash = sha256(&[identity.as_bytes()]);
    sha256(&[
        &prefix,
        &identity_hash,
        salt,
        client_public,
        server_public,
        session_key,
    ])
}

/// `HAMK = H(A | M1 | K)`
fn compute_server_proof(client_public: &[u8], m1: &[u8], session_key: &[u8]) -> [u8; 32] {
    sha256(&[client_public, m1, session_key])
}

/// Derive the password verifier `v = g^x mod N` for (identity, password, salt).
///
/// This is the client-side derivation; the server only ever sees the result.
/// It lives here so the server can exercise the full exchange in tests and so
/// [`client`] and the engine cannot drift apart.
#[must_use]
pub fn derive_verifier(identity: &str, password: &str, salt: &[u8]) -> Vec<u8> {
    let group = &*G_2048;
    let x = compute_x(identity, password, salt);
    group.g().modpow(&x, group.n()).to_bytes_be()
}

/// Check that a submitted verifier is usable with the configured group:
/// non-empty, at most the group's byte length, and not congruent to zero.
pub fn validate_verifier(verifier: &[u8]) -> Result<(), SrpError> {
    let group = &*G_2048;
    if verifier.is_empty() || verifier.len() > group.byte_len() {
        return Err(SrpError::MalformedVerifier);
    }
    let v = BigUint::from_bytes_be(verifier);
    if (v % group.n()) == BigUint::ZERO {
        return Err(SrpError::MalformedVerifier);
    }
    Ok(())
}

/// Generate a fresh server ephemeral keypair for the given verifier:
/// random scalar `b`, `B = (k*v + g^b) mod N`.
pub fn generate_server_ephemeral(verifier: &[u8]) -> Result<ServerEphemeral, SrpError> {
    validate_verifier(verifier)?;
    let group = &*G_2048;
    let k = compute_k(group);
    let v = BigUint::from_bytes_be(verifier);

    for _ in 0..EPHEMERAL_MAX_ATTEMPTS {
        let mut scalar = [0u8; EPHEMERAL_SCALAR_LEN];
        OsRng
            .try_fill_bytes(&mut scalar)
            .map_err(|_| SrpError::EphemeralGeneration)?;
        let b = BigUint::from_bytes_be(&scalar);
        if b == BigUint::ZERO {
            continue;
        }
        let b_pub = (&k * &v + group.g().modpow(&b, group.n())) % group.n();
        if b_pub == BigUint::ZERO {
            continue;
        }
        return Ok(ServerEphemeral {
            private: b.to_bytes_be(),
            public: b_pub.to_bytes_be(),
        });
    }

    Err(SrpError::EphemeralGeneration)
}

/// Verify a client proof `M1` against the recorded challenge state.
///
/// Recomputes the shared secret from `A`, `b`, and the verifier, then compares
/// the expected proof in constant time. Returns the server proof `HAMK` only
/// on a match.
pub fn verify_client_proof(
    identity: &str,
    salt: &[u8],
    verifier: &[u8],
    client_public: &[u8],
    server_public: &[u8],
    server_private: &[u8],
    client_proof: &[u8],
) -> Result<ProofOutcome, SrpError> {
    let group = &*G_2048;

    let a_pub = BigUint::from_bytes_be(client_public);
    if (&a_pub % group.n()) == BigUint::ZERO {
        return Err(SrpError::InvalidClientPublic);
    }

    // Canonical trimmed big-endian forms; a client padding its scalars must
    // still hash the same bytes we do.
    let a_bytes = a_pub.to_bytes_be();
    let b_bytes = BigUint::from_bytes_be(server_public).to_bytes_be();

    let u = compute_u(group, &a_bytes, &b_bytes);
    if u == BigUint::ZERO {
        return Err(SrpError::InvalidClientPublic);
    }

    let v = BigUint::from_bytes_be(verifier);
    let b = BigUint::from_bytes_be(server_private);

    // S = (A * v^u)^b mod N
    let base = (&a_pub * v.modpow(&u, group.n())) % group.n();
    let secret = base.modpow(&b, group.n());
    let session_key = sha256(&[&secret.to_bytes_be()]);

    let expected = compute_m1(group, identity, salt, &a_bytes, &b_bytes, &session_key);
    if expected.ct_eq(client_proof).into() {
        let server_proof = compute_server_proof(&a_bytes, &expected, &session_key).to_vec();
        Ok(ProofOutcome::Verified { server_proof })
    } else {
        Ok(ProofOutcome::Mismatch)
    }
}
