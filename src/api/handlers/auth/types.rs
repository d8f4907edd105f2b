//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    /// Base64-encoded salt chosen by the client.
    pub salt: String,
    /// Hex-encoded SRP verifier derived from the password.
    pub verifier: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub message: String,
}

#[derive(IntoParams, Deserialize, Debug)]
pub struct ChallengeParams {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChallengeResponse {
    /// Base64-encoded salt stored at registration.
    pub salt: String,
    /// Hex-encoded server public value `B`.
    pub server_public: String,
    /// Seconds until the challenge expires.
    pub expires_in: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SrpVerifyRequest {
    pub email: String,
    /// Hex-encoded client public value `A`.
    pub client_public: String,
    /// Hex-encoded client proof `M1`.
    pub client_proof: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SrpVerifyResponse {
    /// Hex-encoded server proof, present only after a successful verify.
    pub server_proof: String,
    pub access_token: String,
    pub token_type: String,
}
