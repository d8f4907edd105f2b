//! SRP group parameters.
//!
//! The exchange runs over the 2048-bit MODP group from RFC 3526 (generator 2).
//! `N` is a safe prime, so the only degenerate public values are the ones that
//! reduce to zero mod `N`; the engine rejects those explicitly.

use num_bigint::BigUint;
use std::sync::LazyLock;

const N_2048_HEX: [&str; 8] = [
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF",
];

/// Shared group parameters: the prime modulus `N` and generator `g`.
pub struct SrpGroup {
    n: BigUint,
    g: BigUint,
}

impl SrpGroup {
    /// Prime modulus.
    #[must_use]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Generator.
    #[must_use]
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Size of `N` in bytes; scalars on the wire never exceed this.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }

    /// Left-pad a big-endian value to the group's byte length.
    ///
    /// Hash inputs that depend on scalar values (`k`, `u`) use the padded
    /// form so leading zero bytes cannot change the digest.
    #[must_use]
    pub fn pad(&self, bytes: &[u8]) -> Vec<u8> {
        let len = self.byte_len();
        if bytes.len() >= len {
            return bytes.to_vec();
        }
        let mut padded = vec![0u8; len - bytes.len()];
        padded.extend_from_slice(bytes);
        padded
    }
}

/// The 2048-bit group used by every exchange in this crate.
pub static G_2048: LazyLock<SrpGroup> = LazyLock::new(|| {
    let hex: String = N_2048_HEX.concat();
    let n = BigUint::parse_bytes(hex.as_bytes(), 16)
        .unwrap_or_else(|| unreachable!("group modulus is a valid hex literal"));
    SrpGroup {
        n,
        g: BigUint::from(2u8),
    }
});
