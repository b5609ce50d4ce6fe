use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use crate::error::AppResult;

const SOURCE_TABLES: &str = include_str!("../migrations/001_source_tables.sql");
const MOVIE_TABLES: &str = include_str!("../migrations/002_movies.sql");
pub const MOVIE_INDEXES: &str = include_str!("../migrations/003_movie_indexes.sql");

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    // every pooled connection to `:memory:` would open its own empty database
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA journal_mode=WAL".to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA synchronous=NORMAL".to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA cache_size=-64000".to_string(),
    ))
    .await?;

    run_sql(&db, SOURCE_TABLES).await?;
    run_sql(&db, MOVIE_TABLES).await?;
    Ok(db)
}

pub async fn run_sql(db: &DatabaseConnection, sql: &str) -> AppResult<()> {
    for stmt in sql.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        db.execute(Statement::from_string(db.get_database_backend(), stmt.to_string())).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_rerunnable() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        run_sql(&db, SOURCE_TABLES).await.unwrap();
        run_sql(&db, MOVIE_TABLES).await.unwrap();
        run_sql(&db, MOVIE_INDEXES).await.unwrap();
        run_sql(&db, MOVIE_INDEXES).await.unwrap();
    }
}
