//! Database helpers for stored credentials and the OTP email outbox.

use anyhow::{Context, Result};
use base64::Engine;
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Outcome when attempting to store a new credential.
#[derive(Debug)]
pub(super) enum RegisterOutcome {
    Created,
    Conflict,
}

/// Stored credential for one identity, decoded to raw bytes.
pub(super) struct CredentialRecord {
    pub(super) user_id: Uuid,
    pub(super) salt: Vec<u8>,
    pub(super) verifier: Vec<u8>,
}

/// Look up the stored credential by normalized email.
pub(super) async fn lookup_credential(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialRecord>> {
    let query = "SELECT id, salt, verifier FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credential")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let salt_text: String = row.get("salt");
    let verifier_text: String = row.get("verifier");
    let salt = base64::engine::general_purpose::STANDARD
        .decode(salt_text.trim())
        .context("stored salt is not valid base64")?;
    let verifier = hex::decode(verifier_text.trim()).context("stored verifier is not valid hex")?;

    Ok(Some(CredentialRecord {
        user_id: row.get("id"),
        salt,
        verifier,
    }))
}

/// Whether a credential already exists for the email.
pub(super) async fn user_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let query = "SELECT 1 FROM users WHERE email = $1 LIMIT 1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check for existing user")?;
    Ok(row.is_some())
}

/// Insert a new credential. Salt and verifier are stored exactly as the
/// validated wire encodings (base64 and hex respectively) and never change
/// afterwards.
pub(super) async fn insert_credential(
    pool: &PgPool,
    email: &str,
    salt_b64: &str,
    verifier_hex: &str,
) -> Result<RegisterOutcome> {
    let query = r"
        INSERT INTO users (email, salt, verifier)
        VALUES ($1, $2, $3)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .bind(salt_b64)
        .bind(verifier_hex)
        .execute(pool)
        .instrument(span)
        .await;

    match result {
        Ok(_) => Ok(RegisterOutcome::Created),
        Err(err) if is_unique_violation(&err) => Ok(RegisterOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert credential"),
    }
}

/// Queue the one-time code for delivery through the email outbox.
pub(super) async fn enqueue_otp_email(pool: &PgPool, email: &str, otp: &str) -> Result<()> {
    let payload_json = json!({
        "email": email,
        "otp": otp,
    });
    let payload_text =
        serde_json::to_string(&payload_json).context("failed to serialize email payload")?;

    let query = r"
        INSERT INTO email_outbox (to_email, template, payload_json)
        VALUES ($1, $2, $3::jsonb)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind("registration_otp")
        .bind(payload_text)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert email outbox row")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CredentialRecord, RegisterOutcome};
    use uuid::Uuid;

    #[test]
    fn register_outcome_debug_names() {
        assert_eq!(format!("{:?}", RegisterOutcome::Created), "Created");
        assert_eq!(format!("{:?}", RegisterOutcome::Conflict), "Conflict");
    }

    #[test]
    fn credential_record_holds_values() {
        let record = CredentialRecord {
            user_id: Uuid::nil(),
            salt: vec![1, 2],
            verifier: vec![3, 4],
        };
        assert_eq!(record.user_id, Uuid::nil());
        assert_eq!(record.salt, vec![1, 2]);
        assert_eq!(record.verifier, vec![3, 4]);
    }
}
