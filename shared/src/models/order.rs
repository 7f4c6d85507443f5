//! Order Model

use super::{ItemId, MenuItem, TableNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Order status
///
/// `pending -> ready -> delivered`. No skips, no moving backward,
/// `delivered` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [Self::Pending, Self::Ready, Self::Delivered];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
        }
    }

    /// The only status this one may advance to
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub fn can_advance_to(&self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Order line, snapshotted from the catalog at submission time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in paise
    pub price: i64,
    pub quantity: u32,
    pub category: String,
    #[serde(default)]
    pub image: String,
}

impl OrderItem {
    pub fn from_menu_item(item: &MenuItem, quantity: u32) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            quantity,
            category: item.category.clone(),
            image: item.image.clone(),
        }
    }

    /// `price × quantity`, `None` on overflow
    pub fn subtotal(&self) -> Option<i64> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

/// Order record as stored by the order service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub table_number: TableNumber,
    pub items: Vec<OrderItem>,
    /// Total in paise, fixed at submission
    pub total: i64,
    pub timestamp: String,
    pub status: OrderStatus,
}

impl Order {
    /// First 8 characters of the id, as shown on receipts
    pub fn short_id(&self) -> &str {
        short_order_id(&self.order_id)
    }
}

pub fn short_order_id(order_id: &str) -> &str {
    match order_id.char_indices().nth(8) {
        Some((idx, _)) => &order_id[..idx],
        None => order_id,
    }
}

/// Snapshot rejected at construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("order has no items")]
    Empty,
    #[error("item {0} has zero quantity")]
    ZeroQuantity(ItemId),
    #[error("item {0} has a negative price")]
    NegativePrice(ItemId),
    #[error("order total overflows")]
    Overflow,
    #[error("claimed total {claimed} does not match computed total {computed}")]
    TotalMismatch { claimed: i64, computed: i64 },
}

/// Sum of line subtotals, rejecting empty snapshots, zero quantities and
/// negative prices
pub fn snapshot_total(items: &[OrderItem]) -> Result<i64, SnapshotError> {
    if items.is_empty() {
        return Err(SnapshotError::Empty);
    }
    items.iter().try_fold(0i64, |acc, item| {
        if item.quantity == 0 {
            return Err(SnapshotError::ZeroQuantity(item.id.clone()));
        }
        if item.price < 0 {
            return Err(SnapshotError::NegativePrice(item.id.clone()));
        }
        item.subtotal()
            .and_then(|s| acc.checked_add(s))
            .ok_or(SnapshotError::Overflow)
    })
}

/// `POST /orders` body
///
/// Built only through [`OrderCreate::from_snapshot`], which enforces
/// `total == Σ price × quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreate {
    table_number: TableNumber,
    items: Vec<OrderItem>,
    total: i64,
    timestamp: String,
    status: OrderStatus,
}

impl OrderCreate {
    pub fn from_snapshot(
        table_number: TableNumber,
        items: Vec<OrderItem>,
        claimed_total: i64,
        timestamp: String,
    ) -> Result<Self, SnapshotError> {
        let computed = snapshot_total(&items)?;
        if computed != claimed_total {
            return Err(SnapshotError::TotalMismatch {
                claimed: claimed_total,
                computed,
            });
        }
        Ok(Self {
            table_number,
            items,
            total: computed,
            timestamp,
            status: OrderStatus::Pending,
        })
    }

    /// Re-check a payload received over the wire
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let computed = snapshot_total(&self.items)?;
        if computed != self.total {
            return Err(SnapshotError::TotalMismatch {
                claimed: self.total,
                computed,
            });
        }
        Ok(())
    }

    pub fn table_number(&self) -> &TableNumber {
        &self.table_number
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Materialize the stored record once the service assigned an id
    pub fn into_order(self, order_id: impl Into<String>) -> Order {
        Order {
            order_id: order_id.into(),
            table_number: self.table_number,
            items: self.items,
            total: self.total,
            timestamp: self.timestamp,
            status: self.status,
        }
    }
}

/// `POST /orders` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: String,
}

/// `PATCH /orders/{order_id}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdateStatus {
    pub status: OrderStatus,
}

/// `GET /orders/ready` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyOrder {
    pub table_number: TableNumber,
    pub order_id: String,
}
