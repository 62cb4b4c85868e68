use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::results::{CreateResultRequest, CreateResultResponse},
    error::AppError,
    leaderboard::Category,
    services::results_service,
    state::SharedState,
};

/// Routes used by game clients to record finished attempts.
pub fn router() -> Router<SharedState> {
    Router::new().route("/results/{category}", post(submit_result))
}

/// Record a finished attempt.
#[utoipa::path(
    post,
    path = "/results/{category}",
    tag = "results",
    params(("category" = Category, Path, description = "Category slug")),
    request_body = CreateResultRequest,
    responses(
        (status = 201, description = "Result stored", body = CreateResultResponse),
        (status = 400, description = "Invalid submission"),
        (status = 503, description = "Result store unavailable")
    )
)]
pub async fn submit_result(
    State(state): State<SharedState>,
    Path(category): Path<Category>,
    Valid(Json(payload)): Valid<Json<CreateResultRequest>>,
) -> Result<(StatusCode, Json<CreateResultResponse>), AppError> {
    let created = results_service::submit(&state, category, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
