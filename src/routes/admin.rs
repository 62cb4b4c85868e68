use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::admin::{LeaderboardQueryParams, LeaderboardResponse, LoginRequest, LoginResponse},
    error::AppError,
    leaderboard::{AdminSession, Category},
    services::{
        admin_service,
        feed_service::{self, LeaderboardSse},
    },
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Token presented by the caller, made available to handlers behind the guard.
#[derive(Clone, Debug)]
pub struct AdminToken(pub String);

/// Admin console endpoints. Everything but login sits behind the session guard.
pub fn router(state: SharedState) -> Router<SharedState> {
    let guarded = Router::new()
        .route("/admin/logout", post(logout))
        .route("/admin/leaderboards/{category}", get(list_leaderboard))
        .route(
            "/admin/leaderboards/{category}/stream",
            get(stream_leaderboard),
        )
        .route(
            "/admin/leaderboards/{category}/export",
            get(export_leaderboard),
        )
        .route(
            "/admin/leaderboards/{category}/results/{id}",
            delete(delete_result),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin_token));

    Router::new()
        .route("/admin/login", post(login))
        .merge(guarded)
}

/// Exchange the configured credential pair for a session token.
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Operator admitted", body = LoginResponse),
        (status = 401, description = "ACCESS DENIED: Invalid Credentials")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(admin_service::login(&state, payload)?))
}

/// Revoke the presented session token.
#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Session token issued by /admin/login")),
    responses((status = 204, description = "Session closed"))
)]
pub async fn logout(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
) -> StatusCode {
    admin_service::logout(&state, &token);
    StatusCode::NO_CONTENT
}

/// Ranked, filtered snapshot of one category.
#[utoipa::path(
    get,
    path = "/admin/leaderboards/{category}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Session token issued by /admin/login"),
        ("category" = Category, Path, description = "Category slug"),
        LeaderboardQueryParams
    ),
    responses(
        (status = 200, description = "Ranked results", body = LeaderboardResponse),
        (status = 503, description = "Result store unavailable")
    )
)]
pub async fn list_leaderboard(
    State(state): State<SharedState>,
    Extension(session): Extension<AdminSession>,
    Path(category): Path<Category>,
    Query(params): Query<LeaderboardQueryParams>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let view = admin_service::list_leaderboard(&state, &session, category, params.into()).await?;
    Ok(Json(view))
}

/// Live ranked view pushed on every change to the category.
#[utoipa::path(
    get,
    path = "/admin/leaderboards/{category}/stream",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Session token issued by /admin/login"),
        ("category" = Category, Path, description = "Category slug"),
        LeaderboardQueryParams
    ),
    responses((status = 200, description = "`leaderboard` and `unavailable` events", content_type = "text/event-stream", body = String))
)]
pub async fn stream_leaderboard(
    State(state): State<SharedState>,
    Extension(session): Extension<AdminSession>,
    Path(category): Path<Category>,
    Query(params): Query<LeaderboardQueryParams>,
) -> Result<LeaderboardSse, AppError> {
    Ok(feed_service::open_stream(&state, &session, category, params.into()).await?)
}

/// Download the ranked view as CSV.
#[utoipa::path(
    get,
    path = "/admin/leaderboards/{category}/export",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Session token issued by /admin/login"),
        ("category" = Category, Path, description = "Category slug"),
        LeaderboardQueryParams
    ),
    responses((status = 200, description = "CSV attachment", content_type = "text/csv", body = String))
)]
pub async fn export_leaderboard(
    State(state): State<SharedState>,
    Extension(session): Extension<AdminSession>,
    Path(category): Path<Category>,
    Query(params): Query<LeaderboardQueryParams>,
) -> Result<Response, AppError> {
    let file =
        admin_service::export_leaderboard(&state, &session, category, params.into()).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}

/// Delete one result from a category.
#[utoipa::path(
    delete,
    path = "/admin/leaderboards/{category}/results/{id}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Session token issued by /admin/login"),
        ("category" = Category, Path, description = "Category slug"),
        ("id" = String, Path, description = "Identifier of the result to delete")
    ),
    responses(
        (status = 204, description = "Result deleted"),
        (status = 502, description = "The store failed the delete")
    )
)]
pub async fn delete_result(
    State(state): State<SharedState>,
    Extension(session): Extension<AdminSession>,
    Path((category, id)): Path<(Category, Uuid)>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_result(&state, &session, category, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn require_admin_token(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    let session = state.session(&provided);
    if !session.is_admitted() {
        return Err(AppError::Unauthorized("invalid admin token".into()));
    }

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(AdminToken(provided));
    Ok(next.run(req).await)
}
