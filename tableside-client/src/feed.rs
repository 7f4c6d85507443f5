//! Order feeds
//!
//! An [`OrderFeed`] caches one filtered listing of orders and refreshes it
//! wholesale. A [`PollHandle`] drives periodic silent refreshes and stops
//! when dropped.
//!
//! Each refresh takes a sequence number when it is issued; a result is only
//! applied if no later-issued refresh has completed already, successfully or
//! not, so a slow response never overwrites fresher data or a fresher error.

use crate::http::OrderQuery;
use crate::lifecycle::OrderLifecycleClient;
use crate::notify::NotificationCenter;
use crate::{ClientError, ClientResult};
use serde::Serialize;
use shared::models::{Order, OrderStatus, TableNumber};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const MSG_LOAD_FAILED: &str = "Failed to load orders. Please try again.";
pub const MSG_UPDATE_FAILED: &str = "Failed to update order status. Please try again.";
pub const MSG_MARKED_READY: &str = "Order marked as ready for delivery!";
pub const MSG_MARKED_DELIVERED: &str = "Order marked as delivered!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    AllTables,
    Table(TableNumber),
}

/// Point-in-time copy of a feed's view state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedView {
    pub orders: Vec<Order>,
    pub filter: Option<OrderStatus>,
    pub loading: bool,
    /// Set by the last failed refresh, cleared by the next applied one
    pub error: Option<String>,
}

/// Dashboard summary over a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub ready: usize,
    pub delivered: usize,
    /// Sum of delivered order totals, in paise
    pub revenue: i64,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut stats, order| {
            stats.total += 1;
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Ready => stats.ready += 1,
                OrderStatus::Delivered => {
                    stats.delivered += 1;
                    stats.revenue = stats.revenue.saturating_add(order.total);
                }
            }
            stats
        })
    }
}

#[derive(Debug, Default)]
struct FeedState {
    view: FeedView,
    /// Any refresh has been issued
    started: bool,
    /// Highest sequence number whose result was applied, success or failure
    completed_seq: u64,
}

struct Inner {
    lifecycle: Arc<OrderLifecycleClient>,
    notices: NotificationCenter,
    scope: FeedScope,
    next_seq: AtomicU64,
    state: RwLock<FeedState>,
}

#[derive(Clone)]
pub struct OrderFeed {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for OrderFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderFeed")
            .field("scope", &self.inner.scope)
            .finish_non_exhaustive()
    }
}

impl OrderFeed {
    pub fn new(
        lifecycle: Arc<OrderLifecycleClient>,
        notices: NotificationCenter,
        scope: FeedScope,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                lifecycle,
                notices,
                scope,
                next_seq: AtomicU64::new(0),
                state: RwLock::new(FeedState::default()),
            }),
        }
    }

    pub fn scope(&self) -> &FeedScope {
        &self.inner.scope
    }

    pub async fn view(&self) -> FeedView {
        self.inner.state.read().await.view.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.inner.state.read().await.view.orders.clone()
    }

    pub async fn filter(&self) -> Option<OrderStatus> {
        self.inner.state.read().await.view.filter
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.view.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.state.read().await.view.error.clone()
    }

    pub async fn stats(&self) -> OrderStats {
        OrderStats::from_orders(&self.inner.state.read().await.view.orders)
    }

    /// Fetch the listing and replace the cache
    ///
    /// Only the first non-silent refresh of a feed raises the loading flag.
    /// On failure the previous cache is kept and the error flag is set; a
    /// notice is shown unless `silent`.
    pub async fn refresh(&self, silent: bool) -> ClientResult<()> {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let (query, raised) = {
            let mut state = self.inner.state.write().await;
            let raised = !silent && !state.started;
            state.started = true;
            if raised {
                state.view.loading = true;
            }
            let query = match &self.inner.scope {
                FeedScope::AllTables => OrderQuery::all(),
                FeedScope::Table(table) => OrderQuery::for_table(table.clone()),
            }
            .with_status(state.view.filter);
            (query, raised)
        };

        tracing::debug!(seq, silent, ?query, "Refreshing order feed");
        let result = self.inner.lifecycle.service().fetch_orders(&query).await;

        let mut state = self.inner.state.write().await;
        if raised {
            state.view.loading = false;
        }
        if seq < state.completed_seq {
            tracing::warn!(seq, completed = state.completed_seq, "Discarding stale refresh result");
            return Ok(());
        }
        state.completed_seq = seq;

        match result {
            Ok(orders) => {
                self.inner.lifecycle.observe_listing(&query, &orders);
                state.view.orders = orders;
                state.view.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(seq, error = %e, "Order feed refresh failed");
                state.view.error = Some(MSG_LOAD_FAILED.to_string());
                drop(state);
                if !silent {
                    self.inner.notices.error(MSG_LOAD_FAILED);
                }
                Err(e)
            }
        }
    }

    /// Change the status filter and refresh silently
    pub async fn set_filter(&self, filter: Option<OrderStatus>) -> ClientResult<()> {
        self.inner.state.write().await.view.filter = filter;
        self.refresh(true).await
    }

    pub async fn request_ready(&self, order_id: &str) -> ClientResult<()> {
        self.request_transition(order_id, OrderStatus::Ready).await
    }

    pub async fn request_delivered(&self, order_id: &str) -> ClientResult<()> {
        self.request_transition(order_id, OrderStatus::Delivered).await
    }

    async fn request_transition(&self, order_id: &str, target: OrderStatus) -> ClientResult<()> {
        let result = self.inner.lifecycle.advance_status(order_id, target).await;
        match &result {
            Ok(_) => {
                let message = match target {
                    OrderStatus::Delivered => MSG_MARKED_DELIVERED,
                    _ => MSG_MARKED_READY,
                };
                self.inner.notices.success(message);
            }
            Err(ClientError::State(_)) => {
                self.inner.notices.error(format!(
                    "This order cannot be marked as {} from its current status.",
                    target
                ));
            }
            Err(e) => {
                tracing::error!(order_id, %target, error = %e, "Status update failed");
                self.inner.notices.error(MSG_UPDATE_FAILED);
            }
        }

        // Refresh even after a failure; the service may have applied it
        if let Err(e) = self.refresh(true).await {
            tracing::debug!(order_id, error = %e, "Refresh after transition failed");
        }
        result.map(|_| ())
    }

    /// Start periodic silent refreshes; they stop when the handle is dropped
    pub fn start_polling(&self, period: Duration) -> PollHandle {
        PollHandle::spawn(self.clone(), period)
    }
}

/// A running poll task, bound to the lifetime of the view that owns it
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn spawn(feed: OrderFeed, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(scope = ?feed.scope(), ?period, "Feed polling started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // An abandoned refresh is dropped, never applied
                        tokio::select! {
                            _ = token.cancelled() => break,
                            result = feed.refresh(true) => {
                                if let Err(e) = result {
                                    tracing::debug!(error = %e, "Background refresh failed");
                                }
                            }
                        }
                    }
                }
            }

            tracing::debug!(scope = ?feed.scope(), "Feed polling stopped");
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel and wait for the task to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Poll task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
