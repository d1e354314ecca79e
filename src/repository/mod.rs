mod conversion;
mod credentials_repository;
mod history_repository;

pub use credentials_repository::CredentialsRepository;
pub use history_repository::HistoryRepository;

#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("In-memory database should open");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations should apply");

    pool
}
