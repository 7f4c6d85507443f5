//! Data models
//!
//! Wire models for the order service contract. Prices are integers in the
//! currency's minor unit (paise).

pub mod dining_table;
pub mod menu_item;
pub mod order;

pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
