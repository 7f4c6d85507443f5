// In-memory order service shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use shared::models::{
    Order, OrderCreate, OrderCreated, OrderStatus, ReadyOrder, TableLookup, TableNumber,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use shared::ErrorCode;
use tableside_client::{ClientError, ClientResult, OrderQuery, OrderService, TableService};

#[derive(Default)]
pub struct FakeService {
    pub tokens: HashMap<String, TableNumber>,
    pub pins: HashMap<String, TableNumber>,
    orders: Mutex<Vec<Order>>,
    fetch_delays: Mutex<VecDeque<Duration>>,
    fetch_failures: Mutex<VecDeque<bool>>,
    next_id: AtomicUsize,
    pub token_calls: AtomicUsize,
    pub pin_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_update: AtomicBool,
    pub server_down: AtomicBool,
}

impl FakeService {
    pub fn new() -> Self {
        let mut service = Self::default();
        service.tokens.insert("tok-4".into(), TableNumber::from("4"));
        service.pins.insert("1234".into(), TableNumber::from("4"));
        service
    }

    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        *self.orders.lock().unwrap() = orders;
        self
    }

    pub fn push_order(&self, order: Order) {
        self.orders.lock().unwrap().push(order);
    }

    pub fn clear_orders(&self) {
        self.orders.lock().unwrap().clear();
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    /// Delay applied to the next `fetch_orders` calls, in order
    pub fn delay_fetches(&self, delays: &[Duration]) {
        self.fetch_delays.lock().unwrap().extend(delays.iter().copied());
    }

    /// Outcome of the next `fetch_orders` calls, in order; `true` fails
    pub fn fail_fetches(&self, failures: &[bool]) {
        self.fetch_failures.lock().unwrap().extend(failures.iter().copied());
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn unavailable() -> ClientError {
        ClientError::Server {
            status: 503,
            body: "unavailable".into(),
        }
    }
}

pub fn order(id: &str, table: &str, status: OrderStatus, total: i64) -> Order {
    Order {
        order_id: id.into(),
        table_number: TableNumber::from(table),
        items: Vec::new(),
        total,
        timestamp: "2026-10-14T12:00:00.000Z".into(),
        status,
    }
}

#[async_trait]
impl TableService for FakeService {
    async fn validate_token(&self, token: &str) -> ClientResult<TableLookup> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.server_down.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.tokens
            .get(token)
            .map(|table| TableLookup {
                table_number: table.clone(),
            })
            .ok_or_else(|| ClientError::not_found(ErrorCode::NotFound, "Invalid table token"))
    }

    async fn validate_pin(&self, pin: &str) -> ClientResult<TableLookup> {
        self.pin_calls.fetch_add(1, Ordering::SeqCst);
        if self.server_down.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.pins
            .get(pin)
            .map(|table| TableLookup {
                table_number: table.clone(),
            })
            .ok_or_else(|| ClientError::not_found(ErrorCode::NotFound, "PIN not found"))
    }
}

#[async_trait]
impl OrderService for FakeService {
    async fn fetch_orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        // Captured at request time, as a server would
        let matching: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .filter(|o| query.table.as_ref().is_none_or(|t| &o.table_number == t))
            .cloned()
            .collect();
        let delay = self.fetch_delays.lock().unwrap().pop_front();
        let scripted = self.fetch_failures.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if scripted.unwrap_or(false) || self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(matching)
    }

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<OrderCreated> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order_id = format!("{:08x}-0000-4000-8000-000000000000", n);
        self.push_order(order.clone().into_order(order_id.clone()));
        Ok(OrderCreated { order_id })
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| ClientError::not_found(ErrorCode::NotFound, "Order not found"))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn ready_orders(&self) -> ClientResult<Vec<ReadyOrder>> {
        Ok(self
            .orders()
            .into_iter()
            .filter(|o| o.status == OrderStatus::Ready)
            .map(|o| ReadyOrder {
                table_number: o.table_number,
                order_id: o.order_id,
            })
            .collect())
    }
}
