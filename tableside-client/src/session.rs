//! Table session
//!
//! Binds an anonymous session to a table. A credential arrives as the `t`
//! query parameter on first load, as a scanned QR payload, or as a 4-digit
//! PIN, and is resolved through [`TableService`].
//!
//! State machine: `Unbound -> Loading -> Bound | Error`.

use crate::http::TableService;
use crate::notify::NotificationCenter;
use crate::{ClientError, ClientResult};
use reqwest::Url;
use shared::ErrorCode;
use shared::models::{Credential, TableIdentity};
use std::sync::Arc;

/// Query parameter carrying the table token
pub const TOKEN_PARAM: &str = "t";

pub const MSG_PIN_FORMAT: &str = "Please enter a 4-digit PIN";
pub const MSG_PIN_NOT_FOUND: &str =
    "Invalid PIN. Please check the 4-digit PIN below the QR code on your table and try again.";
pub const MSG_PIN_OK: &str = "Table PIN validated successfully! Welcome to the menu!";
pub const MSG_INVALID_QR: &str =
    "Invalid QR code. Please scan a valid QR code to access the menu.";
pub const MSG_QR_OK: &str = "QR code validated successfully!";
pub const MSG_SERVER_ERROR: &str = "Server error. Please try again in a moment.";
pub const MSG_NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unbound,
    Loading,
    Bound(TableIdentity),
    Error(String),
}

/// The page location a credential may arrive on
///
/// `take_query_param` must strip the parameter from the visible location
/// before returning, so a reload or share never carries it again.
pub trait PageLocation: Send {
    fn take_query_param(&mut self, name: &str) -> Option<String>;
}

/// [`PageLocation`] over a plain URL
#[derive(Debug, Clone)]
pub struct UrlLocation {
    url: Url,
}

impl UrlLocation {
    pub fn parse(location: &str) -> ClientResult<Self> {
        let url = Url::parse(location)
            .map_err(|e| {
                ClientError::validation(ErrorCode::InvalidFormat, format!("Invalid location: {}", e))
            })?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl PageLocation for UrlLocation {
    fn take_query_param(&mut self, name: &str) -> Option<String> {
        let value = self
            .url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())?;
        // Same as replacing the history entry with the bare path
        self.url.set_query(None);
        self.url.set_fragment(None);
        Some(value)
    }
}

/// Extract a token from a scanned payload
///
/// A link carrying a `t` parameter yields that parameter; anything else is
/// taken verbatim. Blank payloads yield `None`.
pub fn credential_from_scan(payload: &str) -> Option<String> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }
    let token = Url::parse(payload)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == TOKEN_PARAM)
                .map(|(_, v)| v.into_owned())
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| payload.to_string());
    Some(token)
}

/// Exactly four ASCII digits
pub fn validate_pin_format(pin: &str) -> ClientResult<()> {
    if pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ClientError::validation(ErrorCode::InvalidPin, MSG_PIN_FORMAT))
    }
}

fn pin_failure_message(err: &ClientError) -> &'static str {
    match err {
        ClientError::NotFound { .. } => MSG_PIN_NOT_FOUND,
        ClientError::Server { status, .. } if *status >= 500 => MSG_SERVER_ERROR,
        _ => MSG_NETWORK_ERROR,
    }
}

fn token_failure_message(err: &ClientError) -> &'static str {
    match err {
        ClientError::NotFound { .. } => MSG_INVALID_QR,
        ClientError::Server { status, .. } if *status < 500 => MSG_INVALID_QR,
        ClientError::Server { .. } => MSG_SERVER_ERROR,
        ClientError::Http(_) => MSG_NETWORK_ERROR,
        _ => MSG_INVALID_QR,
    }
}

pub struct TableSessionManager {
    service: Arc<dyn TableService>,
    notices: NotificationCenter,
    state: SessionState,
}

impl TableSessionManager {
    pub fn new(service: Arc<dyn TableService>, notices: NotificationCenter) -> Self {
        Self {
            service,
            notices,
            state: SessionState::Unbound,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn table(&self) -> Option<&TableIdentity> {
        match &self.state {
            SessionState::Bound(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.table().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Pick up a token from the page location on first load
    ///
    /// The parameter is scrubbed from `location` before validation starts.
    /// Returns `Ok(None)` when there is no token, or when a table is already
    /// bound (the discovered token is then discarded).
    pub async fn bootstrap<L>(&mut self, location: &mut L) -> ClientResult<Option<TableIdentity>>
    where
        L: PageLocation + ?Sized,
    {
        let Some(token) = location.take_query_param(TOKEN_PARAM) else {
            return Ok(None);
        };
        if let Some(identity) = self.table() {
            tracing::debug!(
                table = %identity.table_number,
                "Table already bound, ignoring token from location"
            );
            return Ok(None);
        }
        self.resolve(Credential::Token(token), false).await.map(Some)
    }

    /// Resolve a table token
    pub async fn present_token(&mut self, token: &str) -> ClientResult<TableIdentity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::validation(
                ErrorCode::TokenInvalid,
                "Table token is empty",
            ));
        }
        self.resolve(Credential::Token(token.to_string()), true).await
    }

    /// Resolve the payload of a scanned QR code
    pub async fn present_scan(&mut self, payload: &str) -> ClientResult<TableIdentity> {
        match credential_from_scan(payload) {
            Some(token) => self.resolve(Credential::Token(token), true).await,
            None => {
                self.notices.error(MSG_INVALID_QR);
                Err(ClientError::validation(
                    ErrorCode::TokenInvalid,
                    "Scanned code is empty",
                ))
            }
        }
    }

    /// Resolve a 4-digit PIN; malformed PINs never reach the network
    pub async fn present_pin(&mut self, pin: &str) -> ClientResult<TableIdentity> {
        if let Err(e) = validate_pin_format(pin) {
            self.notices.error(MSG_PIN_FORMAT);
            return Err(e);
        }
        self.resolve(Credential::Pin(pin.to_string()), true).await
    }

    /// Drop the binding (session teardown)
    pub fn reset(&mut self) {
        self.state = SessionState::Unbound;
    }

    async fn resolve(&mut self, credential: Credential, announce: bool) -> ClientResult<TableIdentity> {
        self.state = SessionState::Loading;

        let result = match &credential {
            Credential::Token(token) => self.service.validate_token(token).await,
            Credential::Pin(pin) => self.service.validate_pin(pin).await,
        };

        match result {
            Ok(lookup) => {
                let identity = TableIdentity {
                    table_number: lookup.table_number,
                    credential,
                };
                tracing::info!(table = %identity.table_number, "Table bound");
                self.state = SessionState::Bound(identity.clone());
                if announce {
                    let message = match identity.credential {
                        Credential::Pin(_) => MSG_PIN_OK,
                        Credential::Token(_) => MSG_QR_OK,
                    };
                    self.notices.success(message);
                }
                Ok(identity)
            }
            Err(e) => {
                let (e, message) = match credential {
                    Credential::Pin(_) => {
                        let e = e.with_not_found_code(ErrorCode::PinNotFound);
                        let message = pin_failure_message(&e);
                        (e, message)
                    }
                    Credential::Token(_) => {
                        let e = e.with_not_found_code(ErrorCode::TableNotFound);
                        let message = token_failure_message(&e);
                        (e, message)
                    }
                };
                tracing::warn!(error = %e, "Table credential rejected");
                self.state = SessionState::Error(message.to_string());
                self.notices.error(message);
                Err(e)
            }
        }
    }
}
