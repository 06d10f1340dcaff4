use serde::Serialize;
use time::OffsetDateTime;

use super::repo_types::ItemWithCategory;

/// Element of `GET /items`.
#[derive(Debug, Serialize)]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

/// Body of `GET /items/{id}`.
#[derive(Debug, Serialize)]
pub struct ItemDetails {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i64,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ItemWithCategory> for ItemSummary {
    fn from(r: ItemWithCategory) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            category: r.category,
        }
    }
}

impl From<ItemWithCategory> for ItemDetails {
    fn from(r: ItemWithCategory) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            category_id: r.category_id,
            category: r.category,
            created_at: r.created_at,
        }
    }
}
