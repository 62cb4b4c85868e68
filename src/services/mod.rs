/// Admin console operations: login, ranked listing, delete and export.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Live leaderboard streaming over Server-Sent Events.
pub mod feed_service;
/// Health check service.
pub mod health_service;
/// Result submission from game clients.
pub mod results_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
