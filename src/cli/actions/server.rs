use crate::api;
use crate::api::email::EmailWorkerConfig;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_key,
            otp_ttl_seconds,
            session_ttl_seconds,
            token_ttl_seconds,
        } => {
            let dsn = Url::parse(&dsn).context("Invalid database DSN")?;

            let auth_config = AuthConfig::new()
                .with_otp_ttl_seconds(otp_ttl_seconds)
                .with_session_ttl_seconds(session_ttl_seconds)
                .with_token_ttl_seconds(token_ttl_seconds);

            api::new(
                port,
                dsn.to_string(),
                token_key,
                auth_config,
                EmailWorkerConfig::new(),
            )
            .await?;
        }
    }

    Ok(())
}
