use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::NewUser,
        services::{hash_password, validate_registration, verify_password, AuthUser, JwtKeys},
    },
    errors::{AppError, AppResult},
    state::AppState,
    storage::DuplicateUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_registration(&mut payload)?;

    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::conflict("Email already registered"));
    }
    if state
        .store
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already taken");
        return Err(AppError::conflict("Username already taken"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await
        .map_err(|e| match e.downcast_ref::<DuplicateUser>() {
            Some(dup) => AppError::conflict(dup.to_string()),
            None => AppError::Internal(e),
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, Json(keys.issue(user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = match (payload.email.as_deref(), payload.username.as_deref()) {
        (Some(email), _) if !email.trim().is_empty() => {
            state
                .store
                .find_user_by_email(&email.trim().to_lowercase())
                .await?
        }
        (_, Some(username)) if !username.trim().is_empty() => {
            state.store.find_user_by_username(username.trim()).await?
        }
        _ => return Err(AppError::bad_request("Email or username required")),
    };

    let Some(user) = user else {
        warn!("login unknown account");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    info!(user_id = %user.id, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(keys.issue(user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::unauthorized(e.to_string()))?;

    let user = state
        .store
        .find_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    Ok(Json(keys.issue(user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = state.store.find_user_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "user not found");
        AppError::unauthorized("User not found")
    })?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use crate::app::build_app;
    use crate::state::AppState;
    use crate::test_support::{register, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn register_returns_tokens_and_public_user() {
        let app = build_app(AppState::fake());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": " Alice@Example.com ",
                "password": "password123",
                "confirm_password": "password123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "alice@example.com");
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["user"].get("password_hash").is_none());
        assert!(body["access_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = build_app(AppState::fake());
        register(&app, "alice").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "password123",
                "confirm_password": "password123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Email already registered");
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_bad_request() {
        let app = build_app(AppState::fake());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "password123",
                "confirm_password": "password124"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Passwords do not match");
    }

    #[tokio::test]
    async fn login_by_username_or_email_and_reject_bad_password() {
        let app = build_app(AppState::fake());
        register(&app, "carol").await;

        for creds in [
            json!({"username": "carol", "password": "password123"}),
            json!({"email": "CAROL@example.com", "password": "password123"}),
        ] {
            let (status, body) =
                send(&app, Method::POST, "/api/v1/auth/login", None, Some(creds)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["user"]["username"], "carol");
        }

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"username": "carol", "password": "nope-nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn refresh_issues_new_pair_and_rejects_access_token() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "dave").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({"refresh_token": auth.refresh_token})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "dave");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({"refresh_token": auth.access_token})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_requires_bearer_access_token() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "erin").await;

        let (status, body) = send(&app, Method::GET, "/api/v1/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing Authorization header");

        let (status, _) =
            send(&app, Method::GET, "/api/v1/me", Some(&auth.refresh_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app, Method::GET, "/api/v1/me", Some(&auth.access_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "erin");
    }
}
