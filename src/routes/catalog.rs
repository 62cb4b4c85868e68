use axum::{Json, Router, routing::get};

use crate::{dto::catalog::CategoryItem, leaderboard::Category, state::SharedState};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "catalog",
    responses((status = 200, description = "Categories in tab order", body = [CategoryItem]))
)]
/// List the game categories that own a leaderboard.
pub async fn list_categories() -> Json<Vec<CategoryItem>> {
    Json(Category::ALL.into_iter().map(CategoryItem::from).collect())
}

/// Configure the catalogue route.
pub fn router() -> Router<SharedState> {
    Router::new().route("/categories", get(list_categories))
}
