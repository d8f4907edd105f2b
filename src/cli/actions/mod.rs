pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        token_key: SecretString,
        otp_ttl_seconds: u64,
        session_ttl_seconds: u64,
        token_ttl_seconds: u64,
    },
}
