//! Embedded schema migrations, applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{DbError, DbResult};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// ## Summary
/// Applies every pending migration to the database at `database_url`.
///
/// Migrations run on a blocking thread over a synchronous `PgConnection`.
///
/// ## Errors
/// Returns an error if the connection cannot be established or a migration fails.
#[tracing::instrument(skip(database_url))]
pub async fn run_pending_migrations(database_url: &str) -> DbResult<()> {
    let url = database_url.to_string();

    let applied = tokio::task::spawn_blocking(move || -> DbResult<Vec<String>> {
        let mut conn = PgConnection::establish(&url)
            .map_err(|e| DbError::MigrationError(format!("Failed to connect: {e}")))?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::MigrationError(format!("Failed to run migrations: {e}")))?;
        Ok(versions.iter().map(ToString::to_string).collect())
    })
    .await
    .map_err(|e| DbError::MigrationError(format!("Migration task failed: {e}")))??;

    tracing::info!(count = applied.len(), versions = ?applied, "Migrations applied");
    Ok(())
}
