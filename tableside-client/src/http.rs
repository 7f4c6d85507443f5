//! HTTP access to the order service
//!
//! [`TableService`], [`OrderService`] and [`TableAdminService`] describe the
//! external contract; [`NetworkOrderService`] implements all three over
//! reqwest. Session, lifecycle and feed code only see the traits.

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use shared::ErrorCode;
use shared::models::{
    ConfigureTables, Order, OrderCreate, OrderCreated, OrderStatus, OrderUpdateStatus,
    QrCodesInfo, ReadyOrder, TableLookup, TableNumber, TablesResponse,
};
use std::time::Duration;

/// Filter for `GET /orders`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// `None` for all statuses
    pub status: Option<OrderStatus>,
    /// `None` for all tables
    pub table: Option<TableNumber>,
}

impl OrderQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_table(table: TableNumber) -> Self {
        Self {
            status: None,
            table: Some(table),
        }
    }

    pub fn with_status(mut self, status: Option<OrderStatus>) -> Self {
        self.status = status;
        self
    }

    /// Whether an order on `table` with `status` falls inside this listing
    pub fn matches(&self, table: &TableNumber, status: OrderStatus) -> bool {
        self.status.is_none_or(|s| s == status) && self.table.as_ref().is_none_or(|t| t == table)
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(table) = &self.table {
            params.push(("table", table.as_str().to_string()));
        }
        params
    }
}

/// Table credential validation
#[async_trait]
pub trait TableService: Send + Sync {
    /// `GET /table/{token}`
    async fn validate_token(&self, token: &str) -> ClientResult<TableLookup>;
    /// `GET /table/pin/{pin}`
    async fn validate_pin(&self, pin: &str) -> ClientResult<TableLookup>;
}

/// Order storage
#[async_trait]
pub trait OrderService: Send + Sync {
    /// `GET /orders?status=&table=`
    async fn fetch_orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>>;
    /// `POST /orders`
    async fn create_order(&self, order: &OrderCreate) -> ClientResult<OrderCreated>;
    /// `PATCH /orders/{order_id}`
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order>;
    /// `GET /orders/ready`
    async fn ready_orders(&self) -> ClientResult<Vec<ReadyOrder>>;
}

/// Table provisioning (dashboard only)
#[async_trait]
pub trait TableAdminService: Send + Sync {
    /// `GET /admin/tables`
    async fn list_tables(&self) -> ClientResult<TablesResponse>;
    /// `POST /admin/tables/configure`
    async fn configure_tables(&self, request: &ConfigureTables) -> ClientResult<TablesResponse>;
    /// `GET /admin/qr-codes`
    async fn qr_codes_info(&self) -> ClientResult<QrCodesInfo>;
    /// `GET /admin/qr-codes/{table_number}` (PNG bytes)
    async fn download_qr_code(&self, table: &TableNumber) -> ClientResult<Vec<u8>>;
    /// `GET /admin/qr-codes/download` (archive bytes)
    async fn download_all_qr_codes(&self) -> ClientResult<Vec<u8>>;
}

/// reqwest-backed implementation of the order service contract
#[derive(Debug, Clone)]
pub struct NetworkOrderService {
    client: Client,
    base: Url,
}

impl NetworkOrderService {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        let base = Url::parse(&config.endpoint(""))
            .map_err(|e| {
                ClientError::validation(ErrorCode::ConfigError, format!("Invalid base URL: {}", e))
            })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::validation(
                ErrorCode::ConfigError,
                format!("Invalid base URL: {}", config.base_url),
            ));
        }
        Ok(Self { client, base })
    }

    /// Base URL including the API prefix
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Build an endpoint URL, percent-encoding each segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    async fn get_bytes(&self, url: Url) -> ClientResult<Vec<u8>> {
        tracing::debug!(%url, "GET (binary)");
        let response = Self::check_status(self.client.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::not_found(ErrorCode::NotFound, text)),
            _ => Err(ClientError::Server {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(Into::into)
    }
}

#[async_trait]
impl TableService for NetworkOrderService {
    async fn validate_token(&self, token: &str) -> ClientResult<TableLookup> {
        self.get(self.url(&["table", token])).await
    }

    async fn validate_pin(&self, pin: &str) -> ClientResult<TableLookup> {
        self.get(self.url(&["table", "pin", pin])).await
    }
}

#[async_trait]
impl OrderService for NetworkOrderService {
    async fn fetch_orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>> {
        let mut url = self.url(&["orders"]);
        let params = query.params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        self.get(url).await
    }

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<OrderCreated> {
        let url = self.url(&["orders"]);
        tracing::debug!(%url, table = %order.table_number(), "POST");
        let response = self.client.post(url).json(order).send().await?;
        Self::handle_response(response).await
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        let url = self.url(&["orders", order_id]);
        tracing::debug!(%url, %status, "PATCH");
        let response = self
            .client
            .patch(url)
            .json(&OrderUpdateStatus { status })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn ready_orders(&self) -> ClientResult<Vec<ReadyOrder>> {
        self.get(self.url(&["orders", "ready"])).await
    }
}

#[async_trait]
impl TableAdminService for NetworkOrderService {
    async fn list_tables(&self) -> ClientResult<TablesResponse> {
        self.get(self.url(&["admin", "tables"])).await
    }

    async fn configure_tables(&self, request: &ConfigureTables) -> ClientResult<TablesResponse> {
        let url = self.url(&["admin", "tables", "configure"]);
        tracing::debug!(%url, total = request.total_tables, "POST");
        let response = self.client.post(url).json(request).send().await?;
        Self::handle_response(response).await
    }

    async fn qr_codes_info(&self) -> ClientResult<QrCodesInfo> {
        self.get(self.url(&["admin", "qr-codes"])).await
    }

    async fn download_qr_code(&self, table: &TableNumber) -> ClientResult<Vec<u8>> {
        self.get_bytes(self.url(&["admin", "qr-codes", table.as_str()]))
            .await
    }

    async fn download_all_qr_codes(&self) -> ClientResult<Vec<u8>> {
        self.get_bytes(self.url(&["admin", "qr-codes", "download"]))
            .await
    }
}
