// REST API for the directory service

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthService, PasswordHasher, RequestAuthenticator, TokenCodec};
use crate::db::CredentialStore;
use crate::model::{NewUser, Profile, ProfileEdit, Role, UserSummary};
use crate::types::{SigningSecret, UserId};
use crate::users::{EditOutcome, UserService};

mod error;
mod extract;


pub use error::{ApiError, ErrorBody};
pub use extract::{ApiJson, Authenticated};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub authenticator: RequestAuthenticator,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        secret: &SigningSecret,
        token_ttl: chrono::Duration,
    ) -> Self {
        let codec = TokenCodec::new(secret);
        Self {
            auth: Arc::new(AuthService::new(
                store.clone(),
                hasher.clone(),
                codec.clone(),
                token_ttl,
            )),
            users: Arc::new(UserService::new(store, hasher)),
            authenticator: RequestAuthenticator::new(codec),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tokens", post(create_token))
        .route("/api/users", get(list_users).post(register_user))
        .route(
            "/api/users/{id}",
            get(get_profile).post(edit_profile).delete(delete_user),
        )
        .route("/api/users/{id}/role", put(toggle_role))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub role: Role,
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn create_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state.auth.login(&request.login, &request.password).await?;
    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}

async fn register_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    let id = state.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(CreatedUser { id })))
}

async fn list_users(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.users.list_active(&ctx).await?))
}

async fn get_profile(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let ctx = caller.targeting(&id)?;
    Ok(Json(state.users.get_profile(&ctx).await?))
}

async fn edit_profile(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
    ApiJson(edit): ApiJson<ProfileEdit>,
) -> Result<Json<EditOutcome>, ApiError> {
    let ctx = caller.targeting(&id)?;
    Ok(Json(state.users.edit_profile(&ctx, edit).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ctx = caller.targeting(&id)?;
    state.users.soft_delete(&ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_role(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let ctx = caller.targeting(&id)?;
    let role = state.users.toggle_role(&ctx).await?;
    Ok(Json(RoleResponse { role }))
}
