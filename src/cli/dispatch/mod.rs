use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        token_key: matches
            .get_one("token-key")
            .map(|s: &String| SecretString::from(s.clone()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --token-key"))?,
        otp_ttl_seconds: matches.get_one::<u64>("otp-ttl").copied().unwrap_or(300),
        session_ttl_seconds: matches
            .get_one::<u64>("session-ttl")
            .copied()
            .unwrap_or(300),
        token_ttl_seconds: matches
            .get_one::<u64>("token-ttl")
            .copied()
            .unwrap_or(1800),
    })
}

#[cfg(test)]
mod tests {
    use super::handler;
    use crate::cli::{actions::Action, commands};
    use anyhow::Result;
    use secrecy::ExposeSecret;

    const TOKEN_KEY: &str = "8f9a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8";

    #[test]
    fn handler_builds_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "passvault",
            "--dsn",
            "postgres://localhost/passvault",
            "--token-key",
            TOKEN_KEY,
            "--otp-ttl",
            "60",
        ]);

        let Action::Server {
            port,
            dsn,
            token_key,
            otp_ttl_seconds,
            session_ttl_seconds,
            token_ttl_seconds,
        } = handler(&matches)?;

        assert_eq!(port, 8080);
        assert_eq!(dsn, "postgres://localhost/passvault");
        assert_eq!(token_key.expose_secret(), TOKEN_KEY);
        assert_eq!(otp_ttl_seconds, 60);
        assert_eq!(session_ttl_seconds, 300);
        assert_eq!(token_ttl_seconds, 1800);
        Ok(())
    }
}
