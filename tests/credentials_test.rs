use std::{sync::Arc, time::Duration};

use chrono::Utc;
use trackport::{
    management::{AuthError, CredentialStore},
    types::{Credential, Provider},
};

mod common;

use common::{FakeRefresher, expiring_credential, token_response, valid_credential};

#[tokio::test]
async fn missing_credential_is_not_connected() {
    let store = CredentialStore::new(60);
    let refresher = FakeRefresher::new(Ok(token_response("unused", None)));

    let result = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await;

    assert!(matches!(
        result,
        Err(AuthError::NotConnected(Provider::Source))
    ));
    assert_eq!(refresher.call_count(), 0);
}

#[tokio::test]
async fn valid_credential_is_returned_without_refresh() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", valid_credential(Provider::Source))
        .await;
    let refresher = FakeRefresher::new(Ok(token_response("unused", None)));

    let credential = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await
        .unwrap();

    assert_eq!(credential.access_token.as_deref(), Some("access"));
    assert_eq!(refresher.call_count(), 0);
}

#[tokio::test]
async fn credential_without_expiry_never_refreshes() {
    let store = CredentialStore::new(60);
    store
        .link(
            "user-1",
            Credential {
                provider: Provider::Source,
                access_token: Some("access".to_string()),
                refresh_token: None,
                expires_at: None,
            },
        )
        .await;
    let refresher = FakeRefresher::new(Ok(token_response("unused", None)));

    let credential = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await
        .unwrap();

    assert_eq!(credential.access_token.as_deref(), Some("access"));
    assert_eq!(refresher.call_count(), 0);
}

#[tokio::test]
async fn expiring_credential_is_refreshed_within_buffer() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", expiring_credential(Provider::Source))
        .await;
    let refresher = FakeRefresher::new(Ok(token_response("fresh", None)));

    let credential = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await
        .unwrap();

    assert_eq!(refresher.call_count(), 1);
    assert_eq!(credential.access_token.as_deref(), Some("fresh"));
    // Refresh token retained because the provider issued no replacement
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh"));
    // New expiry lies beyond the refresh buffer
    assert!(credential.expires_at.unwrap() > Utc::now().timestamp() + 60);
}

#[tokio::test]
async fn rotated_refresh_token_replaces_the_old_one() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", expiring_credential(Provider::Source))
        .await;
    let refresher = FakeRefresher::new(Ok(token_response("fresh", Some("rotated"))));

    let credential = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await
        .unwrap();

    assert_eq!(credential.refresh_token.as_deref(), Some("rotated"));
}

#[tokio::test]
async fn refresh_failure_clears_only_the_failing_provider() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", expiring_credential(Provider::Source))
        .await;
    store
        .link("user-1", valid_credential(Provider::Destination))
        .await;
    let refresher = FakeRefresher::new(Err("token endpoint returned 400".to_string()));

    let result = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await;

    assert!(matches!(
        result,
        Err(AuthError::RefreshFailed(Provider::Source))
    ));

    let snapshot = store.snapshot("user-1").await;
    assert!(!snapshot.get(Provider::Source).unwrap().is_connected());
    assert!(snapshot.get(Provider::Destination).unwrap().is_connected());
}

#[tokio::test]
async fn expired_credential_without_refresh_token_is_cleared_without_a_call() {
    let store = CredentialStore::new(60);
    store
        .link(
            "user-1",
            Credential {
                provider: Provider::Source,
                access_token: Some("stale".to_string()),
                refresh_token: None,
                expires_at: Some(Utc::now().timestamp() - 10),
            },
        )
        .await;
    let refresher = FakeRefresher::new(Ok(token_response("unused", None)));

    let result = store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await;

    assert!(matches!(
        result,
        Err(AuthError::RefreshFailed(Provider::Source))
    ));
    assert_eq!(refresher.call_count(), 0);

    let snapshot = store.snapshot("user-1").await;
    assert!(!snapshot.get(Provider::Source).unwrap().is_connected());
}

#[tokio::test]
async fn refresh_is_single_flight_per_burst() {
    let store = Arc::new(CredentialStore::new(60));
    store
        .link("user-1", expiring_credential(Provider::Source))
        .await;
    let refresher = Arc::new(
        FakeRefresher::new(Ok(token_response("fresh", None)))
            .with_delay(Duration::from_millis(50)),
    );

    let mut handles = Vec::new();
    for _ in 0..5 {
        let store = Arc::clone(&store);
        let refresher = Arc::clone(&refresher);
        handles.push(tokio::spawn(async move {
            store
                .get_valid_credential("user-1", Provider::Source, refresher.as_ref())
                .await
        }));
    }

    for handle in handles {
        let credential = handle.await.unwrap().unwrap();
        assert_eq!(credential.access_token.as_deref(), Some("fresh"));
    }

    // The whole burst shares one upstream refresh call
    assert_eq!(refresher.call_count(), 1);
}

#[tokio::test]
async fn disconnect_clears_the_provider() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", valid_credential(Provider::Source))
        .await;
    store
        .link("user-1", valid_credential(Provider::Destination))
        .await;

    store.disconnect("user-1", Provider::Destination).await;

    let snapshot = store.snapshot("user-1").await;
    assert!(snapshot.get(Provider::Source).unwrap().is_connected());
    assert!(!snapshot.get(Provider::Destination).unwrap().is_connected());
}

#[tokio::test]
async fn old_snapshots_are_unaffected_by_refresh() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", expiring_credential(Provider::Source))
        .await;
    let before = store.snapshot("user-1").await;

    let refresher = FakeRefresher::new(Ok(token_response("fresh", None)));
    store
        .get_valid_credential("user-1", Provider::Source, &refresher)
        .await
        .unwrap();

    // The snapshot taken before the refresh still holds the old token
    assert_eq!(
        before.get(Provider::Source).unwrap().access_token.as_deref(),
        Some("stale")
    );
    let after = store.snapshot("user-1").await;
    assert_eq!(
        after.get(Provider::Source).unwrap().access_token.as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn users_do_not_share_credentials() {
    let store = CredentialStore::new(60);
    store
        .link("user-1", valid_credential(Provider::Source))
        .await;

    let refresher = FakeRefresher::new(Ok(token_response("unused", None)));
    let result = store
        .get_valid_credential("user-2", Provider::Source, &refresher)
        .await;

    assert!(matches!(
        result,
        Err(AuthError::NotConnected(Provider::Source))
    ));
}
