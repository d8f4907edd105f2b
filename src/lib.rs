//! passvault: an SRP-authenticated credential vault API.
//!
//! Registration is gated by an emailed one-time code and stores only a
//! `{salt, verifier}` pair per identity; login is an SRP-6a challenge/verify
//! exchange that ends in a signed bearer token. Passwords never transit the
//! wire and are never stored.

pub mod api;
pub mod cli;
pub mod srp;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::GIT_COMMIT_HASH;

    #[test]
    fn commit_hash_is_never_empty() {
        assert!(!GIT_COMMIT_HASH.is_empty());
    }
}
