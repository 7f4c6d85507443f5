//! Cart model
//!
//! Lines are unique by item id and always carry `quantity >= 1`; a line whose
//! quantity would reach zero is removed instead. Insertion order is preserved
//! so the cart renders in the order items were added. Unit prices are never
//! negative, so neither is the total.

use crate::{ClientError, ClientResult};
use shared::ErrorCode;
use shared::models::{ItemId, MenuItem, OrderItem};

/// One entry in the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> i64 {
        self.item.price.saturating_mul(i64::from(self.quantity))
    }
}

/// Immutable copy of the cart taken at submission time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<OrderItem>,
    /// Total as the cart computed it; re-checked before submission
    pub total: i64,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`, creating the line on first add
    ///
    /// Items with a negative price are rejected and leave the cart unchanged.
    pub fn add_item(&mut self, item: &MenuItem) -> ClientResult<()> {
        if item.price < 0 {
            return Err(ClientError::validation(
                ErrorCode::ValidationFailed,
                format!("Item {} has a negative price ({})", item.id, item.price),
            ));
        }
        match self.lines.iter_mut().find(|l| l.item.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            }),
        }
        Ok(())
    }

    /// Set the quantity of an existing line
    ///
    /// `0` removes the line. Negative quantities are rejected and leave the
    /// cart unchanged. Unknown ids are a no-op.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: i64) -> ClientResult<()> {
        if quantity < 0 {
            return Err(ClientError::validation(
                ErrorCode::ValidationFailed,
                format!("Quantity for item {} cannot be negative ({})", item_id, quantity),
            ));
        }
        if quantity == 0 {
            self.remove_item(item_id);
            return Ok(());
        }
        let quantity = u32::try_from(quantity).map_err(|_| {
            ClientError::validation(
                ErrorCode::ValueOutOfRange,
                format!("Quantity {} is too large", quantity),
            )
        })?;
        if let Some(line) = self.lines.iter_mut().find(|l| &l.item.id == item_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &ItemId) {
        self.lines.retain(|l| &l.item.id != item_id);
    }

    /// Σ unit price × quantity, in paise
    pub fn total_price(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.subtotal()))
    }

    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.item.id == item_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self
                .lines
                .iter()
                .map(|l| OrderItem::from_menu_item(&l.item, l.quantity))
                .collect(),
            total: self.total_price(),
        }
    }
}
