//! Hand-rolled session tokens and password hashing. The token format is
//! deliberately not a general JWT library: three dot-separated base64url
//! (unpadded) segments, `header.payload.signature`, HMAC-SHA256 over
//! `header.payload`, verified in constant time.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{error::ApiError, state::AppState};

const GUEST_EXPIRY_SECONDS: i64 = 60 * 60 * 24;
const USER_EXPIRY_SECONDS: i64 = 60 * 60 * 24 * 7;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub guest: bool,
}

fn b64e(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn b64d(s: &str) -> Result<Vec<u8>, ApiError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|_| ApiError::Unauthorized("malformed token segment".into()))
}

fn sign(secret: &str, signing_input: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::Internal("invalid HMAC key length".into()))?;
    mac.update(signing_input.as_bytes());
    Ok(b64e(&mac.finalize().into_bytes()))
}

/// Mints a session token for `user_id`, expiring in 1 day for guests or 7
/// days otherwise.
pub fn mint_token(secret: &str, user_id: &str, is_guest: bool) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let expiry = if is_guest {
        GUEST_EXPIRY_SECONDS
    } else {
        USER_EXPIRY_SECONDS
    };
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + expiry,
        guest: is_guest,
    };

    let header = Header {
        alg: "HS256",
        typ: "EVC",
    };
    let header_b64 = b64e(&serde_json::to_vec(&header).map_err(|e| ApiError::Internal(e.to_string()))?);
    let payload_b64 =
        b64e(&serde_json::to_vec(&claims).map_err(|e| ApiError::Internal(e.to_string()))?);
    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = sign(secret, &signing_input)?;

    Ok(format!("{signing_input}.{signature}"))
}

/// Verifies a token's signature (constant-time) and expiry, returning its
/// claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiError::Unauthorized("malformed token".into()));
    };

    let signing_input = format!("{header_b64}.{payload_b64}");
    let expected_signature = sign(secret, &signing_input)?;

    let provided_sig_bytes = b64d(signature_b64)?;
    let expected_sig_bytes = b64d(&expected_signature)?;
    if provided_sig_bytes.ct_eq(&expected_sig_bytes).unwrap_u8() != 1 {
        return Err(ApiError::Unauthorized("invalid signature".into()));
    }

    let payload_bytes = b64d(payload_b64)?;
    let claims: Claims = serde_json::from_slice(&payload_bytes)
        .map_err(|_| ApiError::Unauthorized("malformed claims".into()))?;

    if claims.exp < Utc::now().timestamp() {
        return Err(ApiError::Unauthorized("token expired".into()));
    }

    Ok(claims)
}

/// Hashes a password with PBKDF2-HMAC-SHA256 and a random salt, stored as
/// `salt_hex:hash_hex`.
pub fn hash_password(password: &str) -> String {
    use rand::RngCore;
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt_hex = hex_encode(&salt_bytes);

    let mut derived = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt_hex.as_bytes(), 100_000, &mut derived);
    format!("{salt_hex}:{}", hex_encode(&derived))
}

/// Verifies `password` against a `salt_hex:hash_hex` stored hash, in
/// constant time.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Some((salt_hex, expected_hex)) = stored_hash.split_once(':') else {
        return false;
    };
    let Ok(expected) = hex_decode(expected_hex) else {
        return false;
    };

    let mut derived = vec![0u8; expected.len().max(32)];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt_hex.as_bytes(), 100_000, &mut derived);
    derived.truncate(expected.len());

    derived.ct_eq(&expected).unwrap_u8() == 1
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>, ApiError> {
    if s.len() % 2 != 0 {
        return Err(ApiError::Internal("odd-length hex string".into()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| ApiError::Internal("invalid hex digit".into()))
        })
        .collect()
}

/// Extractor requiring a valid bearer token; rejects with 401 otherwise.
#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized("missing Authorization header".into()))?;

        verify_token(state.jwt_secret(), bearer.token())
    }
}

/// Extractor that resolves to `None` rather than rejecting when no (or an
/// invalid) bearer token is present, for routes usable by anonymous guests.
pub struct OptionalClaims(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalClaims {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => verify_token(state.jwt_secret(), bearer.token()).ok(),
            Err(_) => None,
        };
        Ok(OptionalClaims(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips() {
        let token = mint_token("secret", "user-1", false).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(!claims.guest);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_token("secret", "user-1", false).unwrap();
        assert!(verify_token("different-secret", &token).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = mint_token("secret", "user-1", false).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let tampered_payload = b64e(br#"{"sub":"user-2","iat":0,"exp":9999999999,"guest":false}"#);
        parts[1] = &tampered_payload;
        let tampered = parts.join(".");
        assert!(verify_token("secret", &tampered).is_err());
    }

    #[test]
    fn guest_token_expires_sooner_than_user_token() {
        let guest = mint_token("secret", "g1", true).unwrap();
        let user = mint_token("secret", "u1", false).unwrap();
        let guest_claims = verify_token("secret", &guest).unwrap();
        let user_claims = verify_token("secret", &user).unwrap();
        assert!(guest_claims.exp - guest_claims.iat < user_claims.exp - user_claims.iat);
    }

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }
}
