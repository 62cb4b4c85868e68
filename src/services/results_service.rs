//! Result submission from game clients.

use time::OffsetDateTime;
use tracing::info;

use crate::{
    dto::results::{CreateResultRequest, CreateResultResponse},
    error::ServiceError,
    leaderboard::Category,
    state::SharedState,
};

/// Store a finished attempt in the category's collection.
pub async fn submit(
    state: &SharedState,
    category: Category,
    payload: CreateResultRequest,
) -> Result<CreateResultResponse, ServiceError> {
    let store = state.require_result_store().await?;
    let fields = payload.into_fields(OffsetDateTime::now_utc());
    let roll_no = fields.roll_no.clone();
    let id = store.create(category, fields).await?;
    info!(%category, %id, %roll_no, "result submitted");
    Ok(CreateResultResponse { id })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::result_store::{ResultStore, memory::MemoryResultStore},
        state::AppState,
    };

    fn payload() -> CreateResultRequest {
        serde_json::from_str(r#"{"name": "Asha", "rollNo": "21CS001", "timeTaken": 75.5}"#).unwrap()
    }

    #[tokio::test]
    async fn submission_is_stamped_and_stored() {
        let state = AppState::new(AppConfig::default());
        let store = MemoryResultStore::new();
        state.set_result_store(Arc::new(store.clone())).await;

        let response = submit(&state, Category::WordHunt, payload()).await.unwrap();

        let stored = store.list_all(Category::WordHunt).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, response.id);
        assert!(stored[0].fields.timestamp.is_some());
    }

    #[tokio::test]
    async fn submission_without_store_is_degraded() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            submit(&state, Category::WordHunt, payload()).await,
            Err(ServiceError::Degraded)
        ));
    }
}
