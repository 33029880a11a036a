//! Account API and the hosted sign-in callback

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use shared::auth::{LoginRequest, LoginResponse, SessionInfo, SignupRequest};
use shared::error::{ApiResponse, AppError};
use uuid::Uuid;
use validator::Validate;

use super::ApiResult;
use crate::auth::gate::{HOME_PATH, LOGIN_PATH};
use crate::auth::rate_limit::client_ip;
use crate::auth::session::{
    clear_session_cookie, create_token, identity_from_headers, session_cookie,
};
use crate::auth::{ClientIp, LoginThrottle};
use crate::db::{profiles, users};
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::util::{hash_password, normalize_email, verify_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session))
        .route("/auth/callback", get(callback))
        .layer(middleware::from_fn(client_ip))
}

async fn session_info(state: &AppState, user_id: Uuid, email: &str) -> ServiceResult<SessionInfo> {
    let profile = profiles::find_by_user(&state.pool, user_id).await?;
    Ok(SessionInfo {
        user_id,
        email: email.to_string(),
        has_profile: profile.is_some(),
        username: profile.map(|p| p.username),
    })
}

fn issue_session(state: &AppState, user_id: Uuid, email: &str) -> Result<String, AppError> {
    create_token(user_id, email, &state.jwt_secret).map_err(|e| {
        tracing::error!(%user_id, "Failed to sign session token: {e}");
        AppError::internal("Failed to create session")
    })
}

/// JSON body plus the session cookie
fn with_cookie(state: &AppState, body: LoginResponse) -> Response {
    let cookie = session_cookie(&body.token, state.secure_cookies);
    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(body),
    )
        .into_response()
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, ServiceError> {
    req.validate()?;
    let email = normalize_email(&req.email);

    let hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::internal("Failed to create account")
    })?;
    let user = users::create_local(&state.pool, &email, &hash).await?;
    tracing::info!(user_id = %user.id, "Account created");

    let token = issue_session(&state, user.id, &user.email)?;
    let session = session_info(&state, user.id, &user.email).await?;
    Ok(with_cookie(&state, LoginResponse { token, session }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ServiceError> {
    req.validate()?;
    let email = normalize_email(&req.email);

    let key = LoginThrottle::key(&ip, &email);
    if let Err(retry_after) = state.login_throttle.attempt(&key).await {
        tracing::warn!(%ip, retry_after, "Login throttled");
        return Err(AppError::too_many_attempts(retry_after).into());
    }

    let user = users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;
    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !verified {
        tracing::info!(%ip, "Login rejected");
        return Err(AppError::invalid_credentials().into());
    }

    state.login_throttle.succeed(&key).await;
    tracing::info!(user_id = %user.id, "Login succeeded");

    let token = issue_session(&state, user.id, &user.email)?;
    let session = session_info(&state, user.id, &user.email).await?;
    Ok(with_cookie(&state, LoginResponse { token, session }))
}

/// POST /api/auth/logout: always succeeds
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        ApiResponse::ok(),
    )
        .into_response()
}

/// GET /api/auth/session
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionInfo> {
    let identity = identity_from_headers(&headers, &state.jwt_secret)
        .ok_or_else(AppError::not_authenticated)?;
    let user = users::find_by_id(&state.pool, identity.user_id)
        .await?
        .ok_or_else(AppError::not_authenticated)?;
    let info = session_info(&state, user.id, &user.email).await?;
    Ok(ApiResponse::success(info))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

fn login_error(message: &str) -> Response {
    Redirect::to(&format!(
        "{LOGIN_PATH}?error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

/// Where to send the user after signing in
fn redirect_target(requested: Option<&str>) -> &str {
    requested
        .filter(|t| shared::util::is_safe_redirect(t))
        .unwrap_or(HOME_PATH)
}

/// GET /auth/callback?code=&redirectTo=
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return login_error("missing_code");
    };
    let Some(provider) = state.auth_provider.clone() else {
        tracing::error!("Auth callback hit but no auth provider is configured");
        return login_error("auth_not_configured");
    };

    let provider_user = match provider.exchange_code(&code).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Auth code exchange failed: {e}");
            return login_error(&e.to_string());
        }
    };

    let email = normalize_email(&provider_user.email);
    let user = match users::upsert_provider_user(&state.pool, provider_user.id, &email).await {
        Ok(user) => user,
        Err(e) => {
            let e: AppError = e.into();
            return login_error(&e.message);
        }
    };
    let token = match issue_session(&state, user.id, &user.email) {
        Ok(token) => token,
        Err(e) => return login_error(&e.message),
    };

    tracing::info!(user_id = %user.id, "Signed in through auth provider");
    let target = redirect_target(params.redirect_to.as_deref());
    (
        [(header::SET_COOKIE, session_cookie(&token, state.secure_cookies))],
        Redirect::to(target),
    )
        .into_response()
}
