//! Dining Table Model

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque table number as reported by the table service ("Table_1", "7", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TableNumber(String);

impl TableNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for TableNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Credential used to resolve a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Credential {
    /// Token carried by the table's QR code
    Token(String),
    /// 4-digit PIN printed below the QR code
    Pin(String),
}

impl Credential {
    pub fn raw(&self) -> &str {
        match self {
            Credential::Token(t) => t,
            Credential::Pin(p) => p,
        }
    }
}

/// Table bound to the current session. Never mutated, only replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIdentity {
    pub table_number: TableNumber,
    pub credential: Credential,
}

/// `GET /table/{token}` and `GET /table/pin/{pin}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLookup {
    pub table_number: TableNumber,
}

/// Provisioned table (admin view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_number: TableNumber,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub qr_url: Option<String>,
}

/// List tables payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<TableInfo>,
}

/// Bulk configure payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureTables {
    pub total_tables: u32,
}

/// QR code metadata for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeInfo {
    pub table_number: TableNumber,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
}

/// QR code metadata for all tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QrCodesInfo {
    #[serde(default)]
    pub tables: Vec<QrCodeInfo>,
}
