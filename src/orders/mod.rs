//! Order intake
//!
//! Server-authoritative order creation: the client proposes a cart and a
//! total, the server recomputes the total from current catalog prices and
//! rejects anything it cannot reconcile.

mod intake;

pub use intake::create_order;
