//! Tableside ordering client
//!
//! Client-side core of a QR-code restaurant ordering system: the diner's
//! cart, table session binding, order submission, staff order feeds and
//! dashboard access. All network access goes through the traits in
//! [`http`]; [`NetworkOrderService`] implements them over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use tableside_client::{ClientConfig, SessionContext, UrlLocation};
//!
//! # async fn run() -> Result<(), tableside_client::ClientError> {
//! let mut ctx = SessionContext::connect(ClientConfig::from_env())?;
//!
//! let mut location = UrlLocation::parse("https://menu.example.com/?t=abc123")?;
//! ctx.bootstrap(&mut location).await?;
//!
//! let (feed, _poll) = ctx.open_table_feed()?;
//! feed.refresh(false).await?;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod feed;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod notify;
pub mod price;
pub mod scan;
pub mod session;

pub use admin::{AdminGate, DashboardSession, TableAdmin};
pub use cart::{Cart, CartLine, CartSnapshot};
pub use config::ClientConfig;
pub use context::{OrderReceipt, SessionContext};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use feed::{FeedScope, FeedView, OrderFeed, OrderStats, PollHandle};
pub use http::{NetworkOrderService, OrderQuery, OrderService, TableAdminService, TableService};
pub use lifecycle::OrderLifecycleClient;
pub use notify::{Notice, NotificationCenter, Severity};
pub use price::{PriceFormatter, format_price};
pub use scan::{QrDecoder, ScanAdapter, ScanError};
pub use session::{PageLocation, SessionState, TableSessionManager, UrlLocation};

// Re-export shared types for convenience
pub use shared::models::{
    Credential, ItemId, MenuItem, Order, OrderItem, OrderStatus, TableIdentity, TableNumber,
};
