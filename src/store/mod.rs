//! Order store access (PostgreSQL `create_orders` table)
//!
//! Handles:
//! - Earliest-order lookup by initiator source address
//! - Rendering arbitrary row columns into displayable text

mod orders;

pub use orders::{OrderRecord, OrderStore, PgOrderStore, EARLIEST_ORDER_QUERY};

#[cfg(test)]
pub use orders::MockOrderStore;
