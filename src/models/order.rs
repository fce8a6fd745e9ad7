//! Order model
//!
//! Orders are immutable after creation except for status transitions.
//! Line items store `{itemId, quantity}` only; prices are never duplicated
//! into the order — the authoritative total is fixed at creation time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// Payment method accepted at the till
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Debit,
    Ewallet,
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Valid transitions: pending → completed, pending → cancelled
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }
}

/// One `{itemId, quantity}` pair inside an order
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: String,
    pub quantity: i64,
}

/// Order row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order as served over the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn from_parts(row: OrderRow, items: Vec<LineItem>) -> Self {
        Self {
            id: row.id,
            items,
            total: money::to_decimal(row.total_cents),
            payment_method: row.payment_method,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Proposed cart submitted by the client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<LineItem>,
    /// Client-computed total; used only for reconciliation, never persisted
    pub total: Decimal,
    pub payment_method: PaymentMethod,
}

/// Line item annotated with resolved catalog details for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLineItem {
    pub item_id: String,
    pub quantity: i64,
    pub name: String,
    pub price: Decimal,
    pub category_id: String,
}

/// Response payload for a newly created order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub id: String,
    pub items: Vec<ResolvedLineItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Status transition request body
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}
