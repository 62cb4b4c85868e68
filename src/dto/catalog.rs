//! Category catalogue payloads.

use serde::Serialize;
use utoipa::ToSchema;

use crate::leaderboard::Category;

/// Category tab entry shown by the admin console.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryItem {
    /// Identifier used in leaderboard URLs.
    pub id: Category,
    /// Tab label.
    pub label: String,
}

impl From<Category> for CategoryItem {
    fn from(category: Category) -> Self {
        Self {
            id: category,
            label: category.label().to_string(),
        }
    }
}
