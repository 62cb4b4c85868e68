use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the leaderboard admin backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::catalog::list_categories,
        crate::routes::results::submit_result,
        crate::routes::admin::login,
        crate::routes::admin::logout,
        crate::routes::admin::list_leaderboard,
        crate::routes::admin::stream_leaderboard,
        crate::routes::admin::export_leaderboard,
        crate::routes::admin::delete_result,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::catalog::CategoryItem,
            crate::dto::results::CreateResultRequest,
            crate::dto::results::CreateResultResponse,
            crate::dto::admin::LoginRequest,
            crate::dto::admin::LoginResponse,
            crate::dto::admin::LeaderboardResponse,
            crate::dto::admin::RankedEntryDto,
            crate::dto::sse::FeedUnavailableEvent,
            crate::leaderboard::Category,
            crate::leaderboard::SortSpec,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Game categories"),
        (name = "results", description = "Result submission from game clients"),
        (name = "admin", description = "Operator console: ranking, live stream, delete and export"),
    )
)]
pub struct ApiDoc;
