//! Session context
//!
//! Everything one diner's (or one staff member's) session needs, built
//! explicitly and torn down with [`SessionContext::close`].

use crate::admin::AdminGate;
use crate::cart::Cart;
use crate::feed::{FeedScope, OrderFeed, PollHandle};
use crate::http::{OrderService, TableService};
use crate::lifecycle::OrderLifecycleClient;
use crate::notify::NotificationCenter;
use crate::price::PriceFormatter;
use crate::scan::{QrDecoder, ScanAdapter};
use crate::session::{PageLocation, TableSessionManager};
use crate::{ClientConfig, ClientError, ClientResult};
use serde::Serialize;
use shared::ErrorCode;
use shared::models::{TableIdentity, short_order_id};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const MSG_ORDER_PLACED: &str = "Order placed successfully!";
pub const MSG_ORDER_FAILED: &str =
    "Failed to place order. Please check your connection and try again.";

/// Confirmation shown after a successful submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub order_id: String,
    /// First 8 characters of `order_id`
    pub short_id: String,
    /// In paise
    pub total: i64,
}

pub struct SessionContext {
    config: ClientConfig,
    notices: NotificationCenter,
    session: TableSessionManager,
    cart: Cart,
    lifecycle: Arc<OrderLifecycleClient>,
    prices: PriceFormatter,
}

impl SessionContext {
    pub fn new(
        config: ClientConfig,
        tables: Arc<dyn TableService>,
        orders: Arc<dyn OrderService>,
    ) -> Self {
        let notices = NotificationCenter::new(config.notice_dwell);
        Self {
            session: TableSessionManager::new(tables, notices.clone()),
            lifecycle: Arc::new(OrderLifecycleClient::new(orders)),
            prices: PriceFormatter::new(config.currency_symbol.clone()),
            cart: Cart::new(),
            notices,
            config,
        }
    }

    /// Build a context talking to the configured order service
    pub fn connect(config: ClientConfig) -> ClientResult<Self> {
        let service = Arc::new(config.build_order_service()?);
        tracing::info!(base_url = %service.base_url(), "Session context created");
        Ok(Self::new(config, service.clone(), service))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    pub fn session(&self) -> &TableSessionManager {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TableSessionManager {
        &mut self.session
    }

    pub fn table(&self) -> Option<&TableIdentity> {
        self.session.table()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn lifecycle(&self) -> &Arc<OrderLifecycleClient> {
        &self.lifecycle
    }

    pub fn prices(&self) -> &PriceFormatter {
        &self.prices
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::from_config(&self.config)
    }

    /// Resolve a token carried by the page location, scrubbing it first
    pub async fn bootstrap<L>(&mut self, location: &mut L) -> ClientResult<Option<TableIdentity>>
    where
        L: PageLocation + ?Sized,
    {
        self.session.bootstrap(location).await
    }

    /// Run one camera scan and bind the decoded table
    ///
    /// `Ok(None)` when the scan was cancelled.
    pub async fn scan_and_bind<D>(
        &mut self,
        scanner: &ScanAdapter<D>,
        cancel: &CancellationToken,
    ) -> ClientResult<Option<TableIdentity>>
    where
        D: QrDecoder + 'static,
    {
        match scanner.scan(cancel).await {
            Ok(Some(payload)) => self.session.present_scan(&payload).await.map(Some),
            Ok(None) => Ok(None),
            Err(e) => {
                self.notices.error(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Submit the cart for the bound table
    ///
    /// The cart is cleared only once the service has acknowledged the order.
    pub async fn place_order(&mut self) -> ClientResult<OrderReceipt> {
        let snapshot = self.cart.snapshot();
        match self.lifecycle.submit(self.session.table(), &snapshot).await {
            Ok(order_id) => {
                self.cart.clear();
                self.notices.success(MSG_ORDER_PLACED);
                Ok(OrderReceipt {
                    short_id: short_order_id(&order_id).to_string(),
                    order_id,
                    total: snapshot.total,
                })
            }
            Err(e) => {
                match &e {
                    ClientError::Validation { message, .. } => self.notices.error(message.clone()),
                    _ => self.notices.error(MSG_ORDER_FAILED),
                };
                Err(e)
            }
        }
    }

    /// Feed for the bound table, polled at the order interval
    pub fn open_table_feed(&self) -> ClientResult<(OrderFeed, PollHandle)> {
        let table = self.session.table().ok_or_else(|| {
            ClientError::validation(ErrorCode::TableRequired, crate::lifecycle::MSG_TABLE_MISSING)
        })?;
        let scope = FeedScope::Table(table.table_number.clone());
        Ok(self.open_feed(scope, self.config.order_poll_interval))
    }

    /// Staff feed over every table
    pub fn open_kitchen_feed(&self) -> (OrderFeed, PollHandle) {
        self.open_feed(FeedScope::AllTables, self.config.order_poll_interval)
    }

    /// Dashboard summary feed over every order, polled at the summary interval
    pub fn open_summary_feed(&self) -> (OrderFeed, PollHandle) {
        self.open_feed(FeedScope::AllTables, self.config.summary_poll_interval)
    }

    pub fn open_feed(&self, scope: FeedScope, period: Duration) -> (OrderFeed, PollHandle) {
        let feed = OrderFeed::new(self.lifecycle.clone(), self.notices.clone(), scope);
        let poll = feed.start_polling(period);
        (feed, poll)
    }

    /// Tear down the session
    pub fn close(mut self) {
        if let Some(table) = self.session.table() {
            tracing::info!(table = %table.table_number, "Session closed");
        }
        self.cart.clear();
        self.session.reset();
        self.notices.dismiss();
    }
}
