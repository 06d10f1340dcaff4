use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Item {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: OffsetDateTime,
}

/// Item joined with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct ItemWithCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: OffsetDateTime,
    pub category: String,
}
