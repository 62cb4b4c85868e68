//! Business logic powering the admin REST routes. Every operation except
//! login expects an admitted [`AdminSession`].

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::admin::{LeaderboardResponse, LoginRequest, LoginResponse},
    error::ServiceError,
    leaderboard::{
        AdminSession, Category, LeaderboardQuery, ResultRecord,
        export::{self, export_file_name},
    },
    state::SharedState,
};

/// CSV document ready to be served as a download.
#[derive(Debug)]
pub struct ExportFile {
    /// Suggested download name, e.g. `coderush_results_2026-10-19.csv`.
    pub file_name: String,
    /// CSV text including the header row.
    pub body: String,
}

/// Check the submitted pair and open a session for it.
///
/// Rejected credentials yield [`ServiceError::Unauthorized`] and no token.
pub fn login(state: &SharedState, payload: LoginRequest) -> Result<LoginResponse, ServiceError> {
    let session = AdminSession::sign_in(state.config().admin_credentials(), &payload.id, &payload.key);
    let admin_id = match session.require_admitted() {
        Ok(admin_id) => admin_id.to_owned(),
        Err(err) => {
            warn!(id = %payload.id, "admin login rejected");
            return Err(err);
        }
    };

    let token = state.open_session(session);
    Ok(LoginResponse { token, admin_id })
}

/// Revoke the session bound to `token`.
pub fn logout(state: &SharedState, token: &str) {
    if state.close_session(token) {
        info!("admin session closed");
    }
}

async fn load_records(
    state: &SharedState,
    category: Category,
) -> Result<Vec<ResultRecord>, ServiceError> {
    let store = state.require_result_store().await?;
    let entities = store.list_all(category).await?;
    Ok(entities.into_iter().map(ResultRecord::from).collect())
}

/// One-shot ranked view of `category`.
///
/// `total` in the response counts the category before the search filter.
pub async fn list_leaderboard(
    state: &SharedState,
    session: &AdminSession,
    category: Category,
    query: LeaderboardQuery,
) -> Result<LeaderboardResponse, ServiceError> {
    session.require_admitted()?;
    let records = load_records(state, category).await?;
    let ranked = query.rank(&records);
    Ok(LeaderboardResponse::new(
        category,
        &query,
        records.len(),
        &ranked,
    ))
}

/// Remove a single result. Live feeds pick the change up from the store.
///
/// Deleting an id that is already gone succeeds; a backend failure becomes
/// [`ServiceError::DeleteFailed`].
pub async fn delete_result(
    state: &SharedState,
    session: &AdminSession,
    category: Category,
    id: Uuid,
) -> Result<(), ServiceError> {
    let admin_id = session.require_admitted()?;
    let store = state.require_result_store().await?;
    if store.delete(category, id).await {
        info!(%category, %id, %admin_id, "result deleted");
        Ok(())
    } else {
        Err(ServiceError::DeleteFailed { id })
    }
}

/// Render the ranked view of `category` as a dated CSV file.
///
/// Rows follow the same search and sort as the listing, dated by UTC.
pub async fn export_leaderboard(
    state: &SharedState,
    session: &AdminSession,
    category: Category,
    query: LeaderboardQuery,
) -> Result<ExportFile, ServiceError> {
    session.require_admitted()?;
    let records = load_records(state, category).await?;
    let ranked = query.rank(&records);
    let body = export::encode(&ranked)?;
    let file_name = export_file_name(category, OffsetDateTime::now_utc().date());
    info!(%category, rows = ranked.len(), file = %file_name, "leaderboard exported");
    Ok(ExportFile { file_name, body })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::ResultFields,
            result_store::{ResultStore, memory::MemoryResultStore},
        },
        leaderboard::{SortKey, SortOrder, SortSpec},
        state::AppState,
    };

    fn fields(name: &str, time_taken: f64, cgpa: f64) -> ResultFields {
        ResultFields {
            name: name.into(),
            roll_no: format!("{name}-roll"),
            time_taken: Some(time_taken),
            cgpa: Some(cgpa),
            ..ResultFields::default()
        }
    }

    async fn seeded() -> (SharedState, MemoryResultStore, AdminSession) {
        let state = AppState::new(AppConfig::default());
        let store = MemoryResultStore::new();
        for (name, time, cgpa) in [("A", 120.0, 8.0), ("B", 90.0, 7.0), ("C", 90.0, 9.0)] {
            store
                .create(Category::CodeRush, fields(name, time, cgpa))
                .await
                .unwrap();
        }
        state.set_result_store(Arc::new(store.clone())).await;
        let session = AdminSession::Admitted {
            admin_id: "admin".into(),
        };
        (state, store, session)
    }

    #[tokio::test]
    async fn login_issues_token_for_configured_pair() {
        let state = AppState::new(AppConfig::default());
        let response = login(
            &state,
            LoginRequest {
                id: "admin".into(),
                key: "leaderboard".into(),
            },
        )
        .unwrap();
        assert!(state.session(&response.token).is_admitted());

        let denied = login(
            &state,
            LoginRequest {
                id: "admin".into(),
                key: "nope".into(),
            },
        )
        .unwrap_err();
        assert_eq!(
            denied.to_string(),
            "unauthorized: ACCESS DENIED: Invalid Credentials"
        );

        logout(&state, &response.token);
        assert!(!state.session(&response.token).is_admitted());
    }

    #[tokio::test]
    async fn listing_ranks_with_cgpa_tie_break() {
        let (state, _store, session) = seeded().await;
        let view = list_leaderboard(&state, &session, Category::CodeRush, LeaderboardQuery::default())
            .await
            .unwrap();

        let names: Vec<_> = view.entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["C", "B", "A"]);
        assert_eq!(view.total, 3);
    }

    #[tokio::test]
    async fn anonymous_sessions_cannot_read_or_delete() {
        let (state, store, _session) = seeded().await;
        let anonymous = AdminSession::Anonymous;

        assert!(matches!(
            list_leaderboard(&state, &anonymous, Category::CodeRush, LeaderboardQuery::default()).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            delete_result(&state, &anonymous, Category::CodeRush, Uuid::new_v4()).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert_eq!(store.len(Category::CodeRush), 3);
    }

    #[tokio::test]
    async fn failed_delete_surfaces_as_error() {
        let (state, store, session) = seeded().await;
        let victim = store.list_all(Category::CodeRush).await.unwrap()[0].id;

        store.set_online(false);
        assert!(matches!(
            delete_result(&state, &session, Category::CodeRush, victim).await,
            Err(ServiceError::DeleteFailed { id }) if id == victim
        ));

        store.set_online(true);
        delete_result(&state, &session, Category::CodeRush, victim)
            .await
            .unwrap();
        assert_eq!(store.len(Category::CodeRush), 2);
    }

    #[tokio::test]
    async fn export_follows_requested_order() {
        let (state, _store, session) = seeded().await;
        let query = LeaderboardQuery::new("", SortSpec::new(SortKey::Cgpa, SortOrder::Desc));
        let file = export_leaderboard(&state, &session, Category::CodeRush, query)
            .await
            .unwrap();

        assert!(file.file_name.starts_with("coderush_results_"));
        assert!(file.file_name.ends_with(".csv"));
        let rows: Vec<_> = file.body.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[1].starts_with("1,C,"));
        assert!(rows[3].starts_with("3,B,"));
    }
}
