/// Tolerant serde adapters for schema-less documents.
pub mod lenient;
/// Database model definitions.
pub mod models;
/// Result collections and their live subscriptions.
pub mod result_store;
/// Storage abstraction layer for database operations.
pub mod storage;
