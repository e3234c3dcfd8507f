//! Access API router and handlers.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::dto::{AuthUrlRequest, DirectoryEntry, LoginRequest, LoginResponse};
use crate::error::ApiResult;
use crate::state::AccessState;

/// GET / - directory index of the access endpoints.
async fn index() -> Json<Vec<DirectoryEntry>> {
    Json(
        ["auth-url", "login"]
            .into_iter()
            .map(|subdir| DirectoryEntry {
                subdir: subdir.to_string(),
            })
            .collect(),
    )
}

/// POST /auth-url - start a login, returns the authorization URL.
async fn auth_url(
    State(state): State<AccessState>,
    Json(request): Json<AuthUrlRequest>,
) -> ApiResult<Json<String>> {
    request.validate()?;
    let url = state
        .orchestrator
        .begin_login(&request.realm, &request.redirect_url)
        .await?;
    Ok(Json(url))
}

/// POST /login - complete a login from the provider callback.
async fn login(
    State(state): State<AccessState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    request.validate()?;
    let credential = state
        .orchestrator
        .complete_login(
            &request.state,
            &request.code,
            &request.redirect_url,
            &addr.ip().to_string(),
        )
        .await?;
    Ok(Json(LoginResponse::from(credential)))
}

/// Creates the access API router.
///
/// # Routes
///
/// - `GET /` - Directory index
/// - `POST /auth-url` - Start a login against a realm
/// - `POST /login` - Complete a login from the provider callback
pub fn access_router() -> Router<AccessState> {
    Router::new()
        .route("/", get(index))
        .route("/auth-url", post(auth_url))
        .route("/login", post(login))
}
