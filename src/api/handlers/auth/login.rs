//! SRP challenge and proof-verification endpoints.

use crate::api::handlers::auth::{
    state::AuthState,
    storage::lookup_credential,
    types::{ChallengeParams, ChallengeResponse, SrpVerifyRequest, SrpVerifyResponse},
    utils::{decode_hex_field, normalize_email, valid_email},
};
use crate::srp::session::VerifyError;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::Engine;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/v1/auth/srp/challenge",
    params(ChallengeParams),
    responses(
        (status = 200, description = "Challenge opened", body = ChallengeResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 404, description = "Unknown identity", body = String)
    ),
    tag = "auth"
)]
pub async fn srp_challenge(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    params: Option<Query<ChallengeParams>>,
) -> impl IntoResponse {
    let Some(Query(params)) = params else {
        return (StatusCode::BAD_REQUEST, "Missing email".to_string()).into_response();
    };

    let email = normalize_email(&params.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let record = match lookup_credential(&pool, &email).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "User not found".to_string()).into_response();
        }
        Err(err) => {
            error!("Credential lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Challenge failed".to_string(),
            )
                .into_response();
        }
    };

    // Opening replaces any challenge already outstanding for this identity.
    let challenge = match auth_state
        .sessions()
        .open(&email, &record.salt, &record.verifier)
        .await
    {
        Ok(challenge) => challenge,
        Err(err) => {
            error!("Failed to open challenge: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Challenge failed".to_string(),
            )
                .into_response();
        }
    };

    let response = ChallengeResponse {
        salt: base64::engine::general_purpose::STANDARD.encode(&record.salt),
        server_public: hex::encode(challenge.server_public()),
        expires_in: auth_state.sessions().ttl().as_secs(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/srp/verify",
    request_body = SrpVerifyRequest,
    responses(
        (status = 200, description = "Proof verified, token issued", body = SrpVerifyResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Authentication failed", body = String)
    ),
    tag = "auth"
)]
pub async fn srp_verify(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SrpVerifyRequest>>,
) -> impl IntoResponse {
    let request: SrpVerifyRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let client_public = match decode_hex_field(&request.client_public) {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                "Invalid client public value".to_string(),
            )
                .into_response();
        }
    };
    let client_proof = match decode_hex_field(&request.client_proof) {
        Ok(bytes) => bytes,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Invalid client proof".to_string()).into_response();
        }
    };

    // The session is consumed before any check, so whatever happens next this
    // challenge answers at most one proof.
    let server_proof = match auth_state
        .sessions()
        .verify(&email, &client_public, &client_proof)
        .await
    {
        Ok(server_proof) => server_proof,
        Err(VerifyError::NoChallenge) => {
            return (StatusCode::BAD_REQUEST, "No open challenge".to_string()).into_response();
        }
        Err(VerifyError::ChallengeExpired) => {
            return (
                StatusCode::BAD_REQUEST,
                "Challenge has expired".to_string(),
            )
                .into_response();
        }
        Err(VerifyError::InvalidClientPublic) => {
            return (
                StatusCode::BAD_REQUEST,
                "Invalid client public value".to_string(),
            )
                .into_response();
        }
        Err(VerifyError::InvalidProof) => {
            return (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
            )
                .into_response();
        }
    };

    let record = match lookup_credential(&pool, &email).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Credential lookup failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string())
                .into_response();
        }
    };

    let access_token = match auth_state.token_issuer().issue(record.user_id) {
        Ok(token) => token,
        Err(err) => {
            error!("Token issuance failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string())
                .into_response();
        }
    };

    let response = SrpVerifyResponse {
        server_proof: hex::encode(server_proof),
        access_token,
        token_type: "Bearer".to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::{srp_challenge, srp_verify};
    use crate::api::handlers::auth::test_support::auth_state;
    use anyhow::Result;
    use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn srp_challenge_missing_params() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = srp_challenge(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn srp_verify_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = srp_verify(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn srp_verify_rejects_bad_hex() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = srp_verify(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(super::SrpVerifyRequest {
                email: "alice@example.com".to_string(),
                client_public: "not hex".to_string(),
                client_proof: "00ff".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn srp_verify_without_challenge() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = srp_verify(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(super::SrpVerifyRequest {
                email: "alice@example.com".to_string(),
                client_public: "02".to_string(),
                client_proof: "00ff".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
