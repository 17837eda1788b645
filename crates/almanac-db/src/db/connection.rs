use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use almanac_core::config::DatabaseConfig;

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// ## Summary
/// Creates a new database connection pool sized from the database settings.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the configured database URL.
#[tracing::instrument(skip(database), fields(pool_size = database.max_connections))]
pub async fn create_pool(database: &DatabaseConfig) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let size = u32::from(database.max_connections.max(1));
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&database.url);

    let pool = Pool::builder()
        .max_size(size)
        .test_on_check_out(false)
        .build(manager)
        .await?;

    tracing::info!(
        pool_size = size,
        "Database connection pool created successfully"
    );

    Ok(pool)
}

impl DbProvider for DbPool {
    #[tracing::instrument(skip(self))]
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move {
            let conn = self.get().await?;
            Ok(conn)
        })
    }
}
