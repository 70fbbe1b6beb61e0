use std::sync::Arc;
use std::time::Duration;

use reportd_bus::mock::MockBus;

use super::*;

#[tokio::test]
async fn already_authorized_replies_immediately() {
    let bus = MockBus::new();
    bus.set_authorize_code(0);
    let session = AuthorizeSession::new();
    assert!(session.authorize(&bus, 0).await.is_ok());
}

#[tokio::test]
async fn failed_authorize_is_reported() {
    let bus = MockBus::new();
    bus.set_authorize_code(-1);
    let session = AuthorizeSession::new();
    let err = session.authorize(&bus, 0).await.unwrap_err();
    assert!(matches!(err, ServiceError::AuthorizationFailed));
}

#[tokio::test]
async fn already_pending_is_reported() {
    let bus = MockBus::new();
    bus.set_authorize_code(2);
    let session = AuthorizeSession::new();
    let err = session.authorize(&bus, 0).await.unwrap_err();
    assert!(matches!(err, ServiceError::AuthorizationPending));
}

#[tokio::test]
async fn accepted_request_waits_for_authorization_changed_granted() {
    let bus = MockBus::new();
    bus.set_authorize_code(1);
    let session = Arc::new(AuthorizeSession::new());

    let waiting = {
        let session = session.clone();
        let bus = bus.clone();
        tokio::spawn(async move { session.authorize(&bus, 0).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(session.authorization_changed(0));

    assert!(waiting.await.expect("join").is_ok());
}

#[tokio::test]
async fn accepted_request_reports_lost_on_non_zero_status() {
    let bus = MockBus::new();
    bus.set_authorize_code(1);
    let session = Arc::new(AuthorizeSession::new());

    let waiting = {
        let session = session.clone();
        let bus = bus.clone();
        tokio::spawn(async move { session.authorize(&bus, 0).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(session.authorization_changed(3));

    let err = waiting.await.expect("join").unwrap_err();
    assert!(matches!(err, ServiceError::AuthorizationLost));
}

#[test]
fn authorization_changed_with_nothing_pending_is_a_noop() {
    let session = AuthorizeSession::new();
    assert!(!session.authorization_changed(0));
}
