// Table binding by token, scanned link and PIN

mod common;

use common::FakeService;
use shared::ErrorCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tableside_client::session::{
    MSG_INVALID_QR, MSG_PIN_FORMAT, MSG_PIN_NOT_FOUND, MSG_PIN_OK, MSG_SERVER_ERROR,
};
use tableside_client::{
    ClientError, ErrorKind, NotificationCenter, PageLocation, SessionState, TableSessionManager,
    UrlLocation,
};

fn manager(service: &Arc<FakeService>) -> (TableSessionManager, NotificationCenter) {
    let notices = NotificationCenter::default();
    (TableSessionManager::new(service.clone(), notices.clone()), notices)
}

/// Records whether the token was stripped before validation ran
struct ObservedLocation {
    token: Option<String>,
    service: Arc<FakeService>,
    calls_at_scrub: Option<usize>,
}

impl PageLocation for ObservedLocation {
    fn take_query_param(&mut self, name: &str) -> Option<String> {
        assert_eq!(name, "t");
        self.calls_at_scrub = Some(FakeService::calls(&self.service.token_calls));
        self.token.take()
    }
}

#[tokio::test]
async fn test_malformed_pin_rejected_locally() {
    let service = Arc::new(FakeService::new());
    let (mut session, notices) = manager(&service);

    let err = session.present_pin("12a4").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.code(), ErrorCode::InvalidPin);
    assert_eq!(FakeService::calls(&service.pin_calls), 0);
    assert_eq!(session.state(), &SessionState::Unbound);
    assert_eq!(
        notices.current().map(|n| n.message),
        Some(MSG_PIN_FORMAT.to_string())
    );
}

#[tokio::test]
async fn test_unknown_pin_and_server_error_differ() {
    let service = Arc::new(FakeService::new());
    let (mut session, notices) = manager(&service);

    let err = session.present_pin("9999").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.code(), ErrorCode::PinNotFound);
    assert_eq!(session.error_message(), Some(MSG_PIN_NOT_FOUND));
    assert_eq!(notices.current().unwrap().message, MSG_PIN_NOT_FOUND);

    service.server_down.store(true, Ordering::SeqCst);
    let err = session.present_pin("9999").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(session.error_message(), Some(MSG_SERVER_ERROR));
    assert!(!session.is_bound());
}

#[tokio::test]
async fn test_valid_pin_binds_table() {
    let service = Arc::new(FakeService::new());
    let (mut session, notices) = manager(&service);

    let identity = session.present_pin("1234").await.unwrap();
    assert_eq!(identity.table_number.as_str(), "4");
    assert_eq!(session.table(), Some(&identity));
    assert_eq!(notices.current().unwrap().message, MSG_PIN_OK);
}

#[tokio::test]
async fn test_bootstrap_scrubs_before_validating() {
    let service = Arc::new(FakeService::new());
    let (mut session, _) = manager(&service);
    let mut location = ObservedLocation {
        token: Some("bogus".into()),
        service: service.clone(),
        calls_at_scrub: None,
    };

    let err = session.bootstrap(&mut location).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    assert_eq!(err.code(), ErrorCode::TableNotFound);
    assert_eq!(location.calls_at_scrub, Some(0));
    assert!(location.token.is_none());
    assert_eq!(session.error_message(), Some(MSG_INVALID_QR));
}

#[tokio::test]
async fn test_bootstrap_binds_from_url_once() {
    let service = Arc::new(FakeService::new());
    let (mut session, _) = manager(&service);

    let mut location = UrlLocation::parse("https://menu.example.com/?t=tok-4").unwrap();
    let identity = session.bootstrap(&mut location).await.unwrap().unwrap();
    assert_eq!(identity.table_number.as_str(), "4");
    assert_eq!(location.as_str(), "https://menu.example.com/");

    // A second ambient token is ignored once bound
    let mut again = UrlLocation::parse("https://menu.example.com/?t=other").unwrap();
    assert!(session.bootstrap(&mut again).await.unwrap().is_none());
    assert_eq!(FakeService::calls(&service.token_calls), 1);
    assert_eq!(session.table(), Some(&identity));
}

#[tokio::test]
async fn test_bootstrap_without_token_stays_unbound() {
    let service = Arc::new(FakeService::new());
    let (mut session, _) = manager(&service);
    let mut location = UrlLocation::parse("https://menu.example.com/menu").unwrap();
    assert!(session.bootstrap(&mut location).await.unwrap().is_none());
    assert_eq!(session.state(), &SessionState::Unbound);
    assert_eq!(FakeService::calls(&service.token_calls), 0);
}

#[tokio::test]
async fn test_scanned_link_and_raw_token() {
    let service = Arc::new(FakeService::new());
    let (mut session, _) = manager(&service);

    let identity = session
        .present_scan("https://menu.example.com/?t=tok-4")
        .await
        .unwrap();
    assert_eq!(identity.table_number.as_str(), "4");

    session.reset();
    let identity = session.present_scan("tok-4").await.unwrap();
    assert_eq!(identity.credential.raw(), "tok-4");

    let err = session.present_scan("not-a-table").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!session.is_bound());
}
