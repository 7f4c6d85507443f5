//! Staff dashboard access and table provisioning
//!
//! The dashboard is unlocked with a single shared secret. Provisioning calls
//! go straight to [`TableAdminService`]; only the table count is checked
//! locally.

use crate::http::TableAdminService;
use crate::{ClientConfig, ClientError, ClientResult};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use shared::ErrorCode;
use shared::models::{ConfigureTables, QrCodesInfo, TableNumber, TablesResponse};
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const TABLE_COUNT_RANGE: RangeInclusive<u32> = 1..=100;
pub const MSG_TABLE_COUNT: &str = "Please enter a number between 1 and 100";
pub const MSG_BAD_SECRET: &str = "Incorrect password";
pub const MSG_DASHBOARD_DISABLED: &str = "Dashboard access is not configured";

/// Proof that the dashboard secret was presented
#[derive(Debug, Clone)]
pub struct DashboardSession {
    unlocked_at: DateTime<Utc>,
}

impl DashboardSession {
    pub fn unlocked_at(&self) -> DateTime<Utc> {
        self.unlocked_at
    }
}

#[derive(Clone)]
pub struct AdminGate {
    digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.digest.is_some())
            .finish()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

impl AdminGate {
    /// `None` disables the dashboard
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            digest: secret.filter(|s| !s.is_empty()).map(digest),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.admin_secret.as_deref())
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    pub fn unlock(&self, attempt: &str) -> ClientResult<DashboardSession> {
        let Some(expected) = &self.digest else {
            return Err(ClientError::validation(
                ErrorCode::ConfigError,
                MSG_DASHBOARD_DISABLED,
            ));
        };
        let presented = digest(attempt);
        // Fixed-length comparison over the digests
        let diff = expected
            .iter()
            .zip(presented.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff != 0 {
            tracing::warn!("Dashboard unlock rejected");
            return Err(ClientError::validation(
                ErrorCode::InvalidCredentials,
                MSG_BAD_SECRET,
            ));
        }
        tracing::info!("Dashboard unlocked");
        Ok(DashboardSession {
            unlocked_at: Utc::now(),
        })
    }
}

pub fn validate_table_count(count: u32) -> ClientResult<()> {
    if TABLE_COUNT_RANGE.contains(&count) {
        Ok(())
    } else {
        Err(ClientError::validation(
            ErrorCode::ValueOutOfRange,
            MSG_TABLE_COUNT,
        ))
    }
}

/// Table provisioning, available only with a [`DashboardSession`]
pub struct TableAdmin {
    service: Arc<dyn TableAdminService>,
}

impl TableAdmin {
    pub fn new(service: Arc<dyn TableAdminService>) -> Self {
        Self { service }
    }

    pub async fn list_tables(&self, _session: &DashboardSession) -> ClientResult<TablesResponse> {
        self.service.list_tables().await
    }

    /// Replace the table set with `count` tables
    pub async fn configure_tables(
        &self,
        _session: &DashboardSession,
        count: u32,
    ) -> ClientResult<TablesResponse> {
        validate_table_count(count)?;
        let tables = self
            .service
            .configure_tables(&ConfigureTables {
                total_tables: count,
            })
            .await?;
        tracing::info!(count, returned = tables.tables.len(), "Tables configured");
        Ok(tables)
    }

    pub async fn qr_codes_info(&self, _session: &DashboardSession) -> ClientResult<QrCodesInfo> {
        self.service.qr_codes_info().await
    }

    pub async fn download_qr_code(
        &self,
        _session: &DashboardSession,
        table: &TableNumber,
    ) -> ClientResult<Vec<u8>> {
        self.service.download_qr_code(table).await
    }

    pub async fn download_all_qr_codes(&self, _session: &DashboardSession) -> ClientResult<Vec<u8>> {
        self.service.download_all_qr_codes().await
    }
}
