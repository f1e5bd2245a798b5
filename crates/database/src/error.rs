use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to load environment variables for database connection: {0}")]
    ConnectionConfig(String),

    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("the requested record was not found in the database")]
    NotFound,
}
