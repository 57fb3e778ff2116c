//! Bearer-token check for job routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::api::AppState;
use crate::api::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_CONTEXT: &[u8] = b"ticker-api-token";

fn token_mac(key: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
    mac.update(TOKEN_CONTEXT);
    Some(mac)
}

/// Compares tokens through fixed-length MACs so the time taken does not
/// depend on how much of the presented token is correct.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (Some(presented), Some(expected)) = (token_mac(presented), token_mac(expected)) else {
        return false;
    };
    presented
        .verify_slice(&expected.finalize().into_bytes())
        .is_ok()
}

/// Proof that the request carried the configured API token.
///
/// Always succeeds when no token is configured.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.api_token.as_deref() else {
            return Ok(Authorized);
        };

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        if !tokens_match(token, expected) {
            tracing::warn!("Rejected request with invalid API token");
            return Err(ApiError::Unauthorized("Invalid API token".into()));
        }

        Ok(Authorized)
    }
}
