//! Database pool construction and schema bootstrap.
//!
//! The pool is built once in `main` and handed to actix as `web::Data`;
//! nothing in the crate holds a global connection.

use crate::app_config::DatabaseConfig;
use crate::orm;
use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

/// Opens the process-wide connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    log::info!(
        "Database pool ready (max_connections = {})",
        config.max_connections
    );
    Ok(db)
}

/// Creates every table that does not exist yet, parents before children.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, orm::users::Entity).await?;
    create_table(db, orm::email_verifications::Entity).await?;
    create_table(db, orm::password_resets::Entity).await?;
    create_table(db, orm::movies::Entity).await?;
    create_table(db, orm::series::Entity).await?;
    create_table_with(db, orm::episodes::Entity, &mut [episode_natural_key()]).await?;
    create_table_with(db, orm::trending::Entity, &mut [trending_slot_key()]).await?;
    create_table(db, orm::likes::Entity).await?;
    create_table(db, orm::comments::Entity).await?;
    create_table(db, orm::content_requests::Entity).await?;
    create_table(db, orm::subscriptions::Entity).await?;
    create_table(db, orm::payments::Entity).await?;

    log::info!("Database schema verified");
    Ok(())
}

/// One episode row per (series, number, audio track).
fn episode_natural_key() -> IndexCreateStatement {
    use orm::episodes::Column;
    Index::create()
        .col(Column::SeriesId)
        .col(Column::EpisodeNumber)
        .col(Column::Status)
        .unique()
        .to_owned()
}

/// One row per slot. Expired rows are deleted before their slot is reused,
/// so they never collide with a new holder.
fn trending_slot_key() -> IndexCreateStatement {
    use orm::trending::Column;
    Index::create()
        .col(Column::TrendingType)
        .col(Column::Position)
        .unique()
        .to_owned()
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    create_table_with(db, entity, &mut []).await
}

/// Unique keys are emitted as table constraints so they are created together
/// with the table under `IF NOT EXISTS`.
async fn create_table_with<E>(
    db: &DatabaseConnection,
    entity: E,
    unique_keys: &mut [IndexCreateStatement],
) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement: TableCreateStatement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    for key in unique_keys.iter_mut() {
        statement.index(key);
    }

    db.execute(backend.build(&statement)).await?;
    Ok(())
}
