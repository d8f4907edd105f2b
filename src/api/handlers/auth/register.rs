//! OTP-gated registration endpoints.

use crate::api::handlers::auth::{
    state::AuthState,
    storage::{enqueue_otp_email, insert_credential, user_exists, RegisterOutcome},
    types::{RegisterRequest, RegisterResponse, VerifyOtpRequest, VerifyOtpResponse},
    utils::{decode_base64_field, decode_hex_field, normalize_email, valid_email},
};
use crate::srp::{self, pending::OtpError};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 202, description = "One-time code queued for delivery", body = RegisterResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email already registered", body = String)
    ),
    tag = "auth"
)]
pub async fn request_registration(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    match user_exists(&pool, &email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                "Email already registered".to_string(),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(err) => {
            error!("Registration lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    }

    // Re-requesting replaces the outstanding code and restarts its window.
    let otp = match auth_state.pending().issue(&email).await {
        Ok(otp) => otp,
        Err(err) => {
            error!("One-time code generation failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    if let Err(err) = enqueue_otp_email(&pool, &email, &otp).await {
        error!("Failed to enqueue one-time code email: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Registration failed".to_string(),
        )
            .into_response();
    }

    (
        StatusCode::ACCEPTED,
        Json(RegisterResponse {
            message: "One-time code sent".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 201, description = "Credential stored", body = VerifyOtpResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email already registered", body = String)
    ),
    tag = "auth"
)]
pub async fn finalize_registration(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    // The code is checked without being consumed; a mistyped credential below
    // leaves the pending request usable for another attempt.
    if let Err(err) = auth_state.pending().check(&email, &request.otp).await {
        let message = match err {
            OtpError::NoPendingRequest => "No pending registration request",
            OtpError::InvalidOtp => "Invalid one-time code",
            OtpError::OtpExpired => "One-time code has expired",
            OtpError::Generation => "Registration failed",
        };
        return (StatusCode::BAD_REQUEST, message.to_string()).into_response();
    }

    let salt = match decode_base64_field(&request.salt) {
        Ok(salt) => salt,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid salt".to_string()).into_response(),
    };
    if salt.is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid salt".to_string()).into_response();
    }

    let verifier = match decode_hex_field(&request.verifier) {
        Ok(verifier) => verifier,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Invalid verifier".to_string()).into_response();
        }
    };
    if srp::validate_verifier(&verifier).is_err() {
        return (StatusCode::BAD_REQUEST, "Invalid verifier".to_string()).into_response();
    }

    let salt_b64 = request.salt.trim();
    let verifier_hex = request.verifier.trim();
    match insert_credential(&pool, &email, salt_b64, verifier_hex).await {
        Ok(RegisterOutcome::Created) => {
            auth_state.pending().remove(&email).await;
            (
                StatusCode::CREATED,
                Json(VerifyOtpResponse {
                    message: "Registration complete".to_string(),
                }),
            )
                .into_response()
        }
        Ok(RegisterOutcome::Conflict) => {
            // Terminal for this identity; the pending request is useless now.
            auth_state.pending().remove(&email).await;
            (
                StatusCode::CONFLICT,
                "Email already registered".to_string(),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to store credential: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{finalize_registration, request_registration};
    use crate::api::handlers::auth::test_support::auth_state;
    use anyhow::Result;
    use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn request_registration_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = request_registration(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn request_registration_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = request_registration(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(super::RegisterRequest {
                email: "not-an-email".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn finalize_registration_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = finalize_registration(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn finalize_registration_without_pending_request() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = finalize_registration(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(super::VerifyOtpRequest {
                email: "nobody@example.com".to_string(),
                otp: "123456".to_string(),
                salt: "c2FsdA==".to_string(),
                verifier: "02".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn finalize_registration_rejects_bad_salt() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let state = auth_state();
        let otp = state.pending().issue("alice@example.com").await?;

        let response = finalize_registration(
            Extension(pool),
            Extension(state.clone()),
            Some(Json(super::VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                otp: otp.clone(),
                salt: "!!not base64!!".to_string(),
                verifier: "02".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The pending request survives a malformed credential.
        assert!(state.pending().contains("alice@example.com").await);
        Ok(())
    }
}
