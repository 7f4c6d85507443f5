//! Order lifecycle
//!
//! Creates orders from cart snapshots and advances their status. The order
//! service owns the truth; the last-known status map here only guards
//! against sending transitions that are certain to be illegal.

use crate::cart::CartSnapshot;
use crate::http::{OrderQuery, OrderService};
use crate::{ClientError, ClientResult};
use dashmap::DashMap;
use shared::ErrorCode;
use shared::models::{Order, OrderCreate, OrderStatus, TableIdentity, TableNumber};
use std::collections::HashSet;
use shared::util::iso_timestamp;
use std::sync::Arc;

pub const MSG_TABLE_MISSING: &str = "Table number not found. Please scan a valid QR code.";
pub const MSG_CART_EMPTY: &str = "Your cart is empty!";

#[derive(Debug, Clone)]
struct KnownOrder {
    table: TableNumber,
    status: OrderStatus,
}

pub struct OrderLifecycleClient {
    service: Arc<dyn OrderService>,
    /// order_id -> last status seen from the service
    known: DashMap<String, KnownOrder>,
}

impl OrderLifecycleClient {
    pub fn new(service: Arc<dyn OrderService>) -> Self {
        Self {
            service,
            known: DashMap::new(),
        }
    }

    pub fn service(&self) -> &Arc<dyn OrderService> {
        &self.service
    }

    /// Submit a pending order for `table`
    ///
    /// The total is recomputed from the snapshot lines and must match the
    /// snapshot's claimed total. A failed create is never retried.
    pub async fn submit(
        &self,
        table: Option<&TableIdentity>,
        snapshot: &CartSnapshot,
    ) -> ClientResult<String> {
        let Some(table) = table else {
            return Err(ClientError::validation(
                ErrorCode::TableRequired,
                MSG_TABLE_MISSING,
            ));
        };
        if snapshot.is_empty() {
            return Err(ClientError::validation(ErrorCode::OrderEmpty, MSG_CART_EMPTY));
        }

        let order = OrderCreate::from_snapshot(
            table.table_number.clone(),
            snapshot.items.clone(),
            snapshot.total,
            iso_timestamp(chrono::Utc::now()),
        )?;

        let created = match self.service.create_order(&order).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(table = %table.table_number, error = %e, "Order submission failed");
                return Err(e);
            }
        };

        tracing::info!(
            order_id = %created.order_id,
            table = %table.table_number,
            total = order.total(),
            "Order submitted"
        );
        self.known.insert(
            created.order_id.clone(),
            KnownOrder {
                table: table.table_number.clone(),
                status: OrderStatus::Pending,
            },
        );
        Ok(created.order_id)
    }

    /// Advance `order_id` to `target`
    ///
    /// `target` must be the immediate successor of the last-known status,
    /// otherwise nothing is sent and a `State` error is returned.
    pub async fn advance_status(&self, order_id: &str, target: OrderStatus) -> ClientResult<Order> {
        let Some(current) = self.last_known(order_id) else {
            tracing::warn!(order_id, %target, "Transition requested for unknown order");
            return Err(ClientError::State(format!(
                "Order {} has no known status",
                order_id
            )));
        };
        if !current.can_advance_to(target) {
            tracing::warn!(order_id, from = %current, to = %target, "Rejected status transition");
            return Err(ClientError::State(format!(
                "Cannot move order {} from {} to {}",
                order_id, current, target
            )));
        }

        let updated = self
            .service
            .update_status(order_id, target)
            .await
            .map_err(|e| e.with_not_found_code(ErrorCode::OrderNotFound))?;
        tracing::info!(order_id, from = %current, to = %updated.status, "Order status updated");
        self.known.insert(
            updated.order_id.clone(),
            KnownOrder {
                table: updated.table_number.clone(),
                status: updated.status,
            },
        );
        Ok(updated)
    }

    /// Record statuses from a fresh listing answered for `query`
    ///
    /// Known orders the query covers but the listing no longer contains are
    /// forgotten, so the map stays bounded by what the service still reports.
    pub fn observe_listing(&self, query: &OrderQuery, orders: &[Order]) {
        let fresh: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        self.known.retain(|id, known| {
            fresh.contains(id.as_str()) || !query.matches(&known.table, known.status)
        });
        for order in orders {
            self.known.insert(
                order.order_id.clone(),
                KnownOrder {
                    table: order.table_number.clone(),
                    status: order.status,
                },
            );
        }
    }

    pub fn last_known(&self, order_id: &str) -> Option<OrderStatus> {
        self.known.get(order_id).map(|k| k.status)
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}
