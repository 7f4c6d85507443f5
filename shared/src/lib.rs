//! Shared types for the tableside ordering client
//!
//! Wire models exchanged with the order service and the error code table
//! used by both the client crate and any server implementing the contract.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorCode};
pub use models::{
    Credential, ItemId, MenuItem, Order, OrderCreate, OrderCreated, OrderItem, OrderStatus,
    OrderUpdateStatus, ReadyOrder, TableIdentity, TableLookup, TableNumber,
};
