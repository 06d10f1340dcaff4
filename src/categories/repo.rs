use sqlx::SqlitePool;

use super::repo_types::Category;
use crate::db::StoreError;

pub async fn list(db: &SqlitePool) -> Result<Vec<Category>, StoreError> {
    let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// A name that already exists comes back as [`StoreError::Duplicate`].
pub async fn create(db: &SqlitePool, name: &str) -> Result<Category, StoreError> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name)
        VALUES (?)
        RETURNING id, name
        "#,
    )
    .bind(name)
    .fetch_one(db)
    .await?;
    Ok(row)
}
