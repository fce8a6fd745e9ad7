//! Data models
//!
//! Row structs map the SQLite schema; view structs are the wire shapes.

mod category;
mod menu_item;
mod order;

pub use category::{ALL_CATEGORY, Category, CategoryCreate, CategoryUpdate};
pub use menu_item::{MenuItemCreate, MenuItemRow, MenuItemUpdate, MenuItemView};
pub use order::{
    CreatedOrder, LineItem, Order, OrderRequest, OrderRow, OrderStatus, PaymentMethod,
    ResolvedLineItem, StatusUpdate,
};
