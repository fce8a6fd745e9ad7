//! Menu item (catalog entry) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// Catalog row as stored. Prices are integer cents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuItemRow {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category_id: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Catalog entry as served over the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<MenuItemRow> for MenuItemView {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: money::to_decimal(row.price_cents),
            category_id: row.category_id,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub name: String,
    pub price: Decimal,
    pub category_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
}
