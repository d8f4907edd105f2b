//! Client half of the SRP-6a exchange.
//!
//! Mirrors the conventions documented in the parent module so the two halves
//! cannot drift: trimmed big-endian scalars, SHA-256, padded `k`/`u` inputs.
//! The server never runs this code on behalf of a user; it exists for tests,
//! tooling, and as the reference for client implementors.

use num_bigint::BigUint;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::group::G_2048;
use super::{
    compute_k, compute_m1, compute_server_proof, compute_u, compute_x, SrpError,
};

const SALT_LEN: usize = 16;
const EPHEMERAL_SCALAR_LEN: usize = 32;
const EPHEMERAL_MAX_ATTEMPTS: usize = 4;

/// Draw a fresh random salt for registration.
pub fn generate_salt() -> Result<Vec<u8>, SrpError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| SrpError::EphemeralGeneration)?;
    Ok(salt.to_vec())
}

/// Client ephemeral keypair for one exchange.
pub struct ClientEphemeral {
    private: Vec<u8>,
    public: Vec<u8>,
}

impl ClientEphemeral {
    /// Public value `A`, sent with the proof.
    #[must_use]
    pub fn public(&self) -> &[u8] {
        &self.public
    }
}

/// Proof material computed from the server's challenge: `M1` plus the session
/// key needed to check the server's answering proof.
pub struct ClientProof {
    proof: [u8; 32],
    session_key: [u8; 32],
    client_public: Vec<u8>,
}

impl ClientProof {
    /// The proof `M1` to submit.
    #[must_use]
    pub fn proof(&self) -> &[u8] {
        &self.proof
    }

    /// Check the server's proof `HAMK` in constant time.
    #[must_use]
    pub fn verify_server_proof(&self, server_proof: &[u8]) -> bool {
        let expected =
            compute_server_proof(&self.client_public, &self.proof, &self.session_key);
        expected.ct_eq(server_proof).into()
    }
}

/// Generate a fresh client ephemeral: random scalar `a`, `A = g^a mod N`.
pub fn generate_client_ephemeral() -> Result<ClientEphemeral, SrpError> {
    let group = &*G_2048;
    for _ in 0..EPHEMERAL_MAX_ATTEMPTS {
        let mut scalar = [0u8; EPHEMERAL_SCALAR_LEN];
        OsRng
            .try_fill_bytes(&mut scalar)
            .map_err(|_| SrpError::EphemeralGeneration)?;
        let a = BigUint::from_bytes_be(&scalar);
        if a == BigUint::ZERO {
            continue;
        }
        let a_pub = group.g().modpow(&a, group.n());
        if (&a_pub % group.n()) == BigUint::ZERO {
            continue;
        }
        return Ok(ClientEphemeral {
            private: a.to_bytes_be(),
            public: a_pub.to_bytes_be(),
        });
    }
    Err(SrpError::EphemeralGeneration)
}

/// Compute the client proof `M1` for a server challenge.
///
/// `S = (B - k*g^x)^(a + u*x) mod N`; the subtraction is lifted by `N` so the
/// arithmetic stays non-negative.
pub fn compute_proof(
    identity: &str,
    password: &str,
    salt: &[u8],
    ephemeral: &ClientEphemeral,
    server_public: &[u8],
) -> Result<ClientProof, SrpError> {
    let group = &*G_2048;

    let b_pub = BigUint::from_bytes_be(server_public);
    if (&b_pub % group.n()) == BigUint::ZERO {
        return Err(SrpError::InvalidClientPublic);
    }
    let b_bytes = b_pub.to_bytes_be();

    let a = BigUint::from_bytes_be(&ephemeral.private);
    let u = compute_u(group, &ephemeral.public, &b_bytes);
    if u == BigUint::ZERO {
        return Err(SrpError::InvalidClientPublic);
    }

    let k = compute_k(group);
    let x = compute_x(identity, password, salt);
    let gx = group.g().modpow(&x, group.n());

    let base = (&b_pub + group.n() - (&k * &gx) % group.n()) % group.n();
    let exponent = &a + &u * &x;
    let secret = base.modpow(&exponent, group.n());

    let mut hasher = Sha256::new();
    hasher.update(secret.to_bytes_be());
    let session_key: [u8; 32] = hasher.finalize().into();

    let proof = compute_m1(
        group,
        identity,
        salt,
        &ephemeral.public,
        &b_bytes,
        &session_key,
    );

    Ok(ClientProof {
        proof,
        session_key,
        client_public: ephemeral.public.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srp;

    #[test]
    fn full_exchange_round_trip() {
        let salt = generate_salt().expect("salt");
        let verifier = srp::derive_verifier("u@x.com", "hunter2hunter2", &salt);
        let server = srp::generate_server_ephemeral(&verifier).expect("server ephemeral");
        let ephemeral = generate_client_ephemeral().expect("client ephemeral");

        let proof = compute_proof("u@x.com", "hunter2hunter2", &salt, &ephemeral, server.public())
            .expect("proof");

        let outcome = srp::verify_client_proof(
            "u@x.com",
            &salt,
            &verifier,
            ephemeral.public(),
            server.public(),
            server.private(),
            proof.proof(),
        )
        .expect("verify");

        match outcome {
            srp::ProofOutcome::Verified { server_proof } => {
                assert!(proof.verify_server_proof(&server_proof));
                assert!(!proof.verify_server_proof(&[0u8; 32]));
            }
            srp::ProofOutcome::Mismatch => panic!("valid exchange reported as mismatch"),
        }
    }

    #[test]
    fn degenerate_server_public_is_rejected() {
        let salt = generate_salt().expect("salt");
        let ephemeral = generate_client_ephemeral().expect("client ephemeral");
        let zero = G_2048.n().to_bytes_be();

        let result = compute_proof("u@x.com", "pw", &salt, &ephemeral, &zero);
        assert!(matches!(result, Err(SrpError::InvalidClientPublic)));
    }
}
