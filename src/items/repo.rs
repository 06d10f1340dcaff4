use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use time::OffsetDateTime;

use super::repo_types::{Item, ItemWithCategory};
use crate::{
    db::StoreError,
    validation::{ItemPatch, NewItem},
};

pub async fn list(db: &SqlitePool) -> Result<Vec<ItemWithCategory>, StoreError> {
    let rows = sqlx::query_as::<_, ItemWithCategory>(
        r#"
        SELECT i.id, i.category_id, i.name, i.description, i.price, i.created_at,
               c.name AS category
          FROM items i
          JOIN categories c ON c.id = i.category_id
         ORDER BY i.id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<ItemWithCategory>, StoreError> {
    let row = sqlx::query_as::<_, ItemWithCategory>(
        r#"
        SELECT i.id, i.category_id, i.name, i.description, i.price, i.created_at,
               c.name AS category
          FROM items i
          JOIN categories c ON c.id = i.category_id
         WHERE i.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// An unknown `category_id` comes back as [`StoreError::ForeignKey`].
pub async fn create(db: &SqlitePool, new: &NewItem) -> Result<Item, StoreError> {
    let row = sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO items (category_id, name, description, price, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, category_id, name, description, price, created_at
        "#,
    )
    .bind(new.category_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Change only the columns present in `patch`. Returns the number of rows hit.
/// `patch` must not be empty.
pub async fn update(db: &SqlitePool, id: i64, patch: ItemPatch) -> Result<u64, StoreError> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = patch.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = patch.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(price) = patch.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        if let Some(category_id) = patch.category_id {
            set.push("category_id = ").push_bind_unseparated(category_id);
        }
    }
    qb.push(" WHERE id = ").push_bind(id);

    let res = qb.build().execute(db).await?;
    Ok(res.rows_affected())
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<u64, StoreError> {
    let res = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
