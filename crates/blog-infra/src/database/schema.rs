//! Schema synchronization.
//!
//! Tables are created from the entity definitions at startup instead of
//! being managed by versioned migrations. Existing tables are left alone.

use sea_orm::{ConnectionTrait, DbConn, DbErr, Schema};

use super::entity::{category, post, post_category, user};

/// Create any missing tables from the entity definitions.
pub async fn sync_schema(db: &DbConn) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Referenced tables first so foreign keys resolve.
    let mut statements = [
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(post::Entity),
        schema.create_table_from_entity(post_category::Entity),
    ];

    for statement in &mut statements {
        db.execute(backend.build(statement.if_not_exists())).await?;
    }

    tracing::info!("Database schema synchronized");
    Ok(())
}
