use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::{normalize_email, AuthResponse, LoginRequest, NewUser, RegistrationRequest, User};
use crate::error::{AppError, AppJson};
use crate::state::AppState;
use crate::{password, token};

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = token::issue(user.id, &state.config.jwt_secret, state.config.token_ttl)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (username, email) = payload.validate()?;
    let password_hash = password::hash(payload.password).await?;

    let user = state
        .store
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        return Err(AppError::Unauthorized("Invalid credentials"));
    };

    if !password::verify(payload.password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    Ok(Json(auth_response(&state, &user)?))
}
