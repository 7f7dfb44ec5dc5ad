use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::{
    Res, destination, source,
    types::{Credential, CredentialSet, Provider, TokenResponse},
    warning,
};

/// A credential is missing or could not be brought back to a usable state.
///
/// Always tagged with the provider it concerns; the other provider's
/// credential is never touched by a failure here.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} provider is not connected")]
    NotConnected(Provider),
    #[error("failed to refresh {0} provider credentials")]
    RefreshFailed(Provider),
}

/// Exchanges a refresh token for a new access token at a provider's token
/// endpoint.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(
        &self,
        provider: Provider,
        refresh_token: &str,
    ) -> Result<TokenResponse, String>;
}

/// Refreshes against the providers' configured token endpoints.
pub struct HttpTokenRefresher;

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(
        &self,
        provider: Provider,
        refresh_token: &str,
    ) -> Result<TokenResponse, String> {
        match provider {
            Provider::Source => source::auth::refresh_token(refresh_token).await,
            Provider::Destination => destination::auth::refresh_token(refresh_token).await,
        }
    }
}

/// Per-user credential sets, shared across concurrent migration requests.
///
/// Holds immutable `CredentialSet` snapshots and swaps them whole on every
/// mutation. Refreshes are single-flight per (user, provider): providers may
/// invalidate a refresh token after first use, so concurrent callers must
/// never race duplicate refresh calls.
pub struct CredentialStore {
    sets: RwLock<HashMap<String, Arc<CredentialSet>>>,
    refresh_flights: Mutex<HashMap<(String, Provider), Arc<Mutex<()>>>>,
    refresh_buffer_secs: i64,
    persist_dir: Option<PathBuf>,
}

impl CredentialStore {
    pub fn new(refresh_buffer_secs: i64) -> Self {
        CredentialStore {
            sets: RwLock::new(HashMap::new()),
            refresh_flights: Mutex::new(HashMap::new()),
            refresh_buffer_secs,
            persist_dir: None,
        }
    }

    /// Enables best-effort JSON persistence of snapshots under `dir`.
    pub fn with_persistence(mut self, dir: PathBuf) -> Self {
        self.persist_dir = Some(dir);
        self
    }

    /// Returns the current snapshot for a user, loading a persisted one on
    /// first access after a restart.
    pub async fn snapshot(&self, user_id: &str) -> Arc<CredentialSet> {
        if let Some(set) = self.sets.read().await.get(user_id) {
            return Arc::clone(set);
        }

        let loaded = self.load_user(user_id).await.unwrap_or_default();
        let mut sets = self.sets.write().await;
        Arc::clone(
            sets.entry(user_id.to_string())
                .or_insert_with(|| Arc::new(loaded)),
        )
    }

    /// Stores a credential obtained on provider linkage, replacing any
    /// previous credential for that provider.
    pub async fn link(&self, user_id: &str, credential: Credential) {
        self.update_set(user_id, |set| set.with_credential(credential))
            .await;
    }

    /// Explicit disconnect: clears that provider's fields for the user.
    pub async fn disconnect(&self, user_id: &str, provider: Provider) {
        self.clear(user_id, provider).await;
    }

    /// Returns a credential that is valid for at least the refresh buffer,
    /// refreshing through `refresher` when necessary.
    ///
    /// On an unrefreshable or failed credential the provider's fields are
    /// cleared and an `AuthError` tagged with that provider is returned; the
    /// other provider is untouched.
    pub async fn get_valid_credential(
        &self,
        user_id: &str,
        provider: Provider,
        refresher: &dyn TokenRefresher,
    ) -> Result<Credential, AuthError> {
        let credential = self.current(user_id, provider).await;
        if !credential.is_connected() {
            return Err(AuthError::NotConnected(provider));
        }
        if !credential.needs_refresh(self.refresh_buffer_secs) {
            return Ok(credential);
        }

        let flight = self.refresh_flight(user_id, provider).await;
        let _guard = flight.lock().await;

        // Re-check after acquiring the flight: a caller that held it before
        // us may already have refreshed (or cleared) this credential.
        let credential = self.current(user_id, provider).await;
        if !credential.is_connected() {
            return Err(AuthError::NotConnected(provider));
        }
        if !credential.needs_refresh(self.refresh_buffer_secs) {
            return Ok(credential);
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            // Expired with no refresh token: clearing is the only option.
            self.clear(user_id, provider).await;
            return Err(AuthError::RefreshFailed(provider));
        };

        match refresher.refresh(provider, &refresh_token).await {
            Ok(token) => {
                let refreshed = Credential {
                    provider,
                    access_token: Some(token.access_token),
                    // keep the old refresh token unless the provider rotated it
                    refresh_token: token.refresh_token.or(credential.refresh_token),
                    expires_at: Some(Utc::now().timestamp() + token.expires_in as i64),
                };
                self.update_set(user_id, |set| set.with_credential(refreshed.clone()))
                    .await;
                Ok(refreshed)
            }
            Err(e) => {
                warning!(
                    "Failed to refresh {} credentials for user {}: {}",
                    provider,
                    user_id,
                    e
                );
                self.clear(user_id, provider).await;
                Err(AuthError::RefreshFailed(provider))
            }
        }
    }

    async fn current(&self, user_id: &str, provider: Provider) -> Credential {
        self.snapshot(user_id)
            .await
            .get(provider)
            .cloned()
            .unwrap_or_else(|| Credential::disconnected(provider))
    }

    async fn refresh_flight(&self, user_id: &str, provider: Provider) -> Arc<Mutex<()>> {
        let mut flights = self.refresh_flights.lock().await;
        Arc::clone(
            flights
                .entry((user_id.to_string(), provider))
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    async fn clear(&self, user_id: &str, provider: Provider) {
        self.update_set(user_id, |set| set.with_cleared(provider))
            .await;
    }

    /// Read-modify-write of a user's snapshot, atomically under the write
    /// lock, followed by a best-effort persistence write.
    async fn update_set<F>(&self, user_id: &str, update: F)
    where
        F: FnOnce(&CredentialSet) -> CredentialSet,
    {
        // Make sure a persisted snapshot is loaded before modifying it.
        self.snapshot(user_id).await;

        let next = {
            let mut sets = self.sets.write().await;
            let current = sets.entry(user_id.to_string()).or_default();
            let next = Arc::new(update(current.as_ref()));
            sets.insert(user_id.to_string(), Arc::clone(&next));
            next
        };

        if let Err(e) = self.persist(user_id, &next).await {
            warning!("Failed to persist credentials for user {}: {}", user_id, e);
        }
    }

    async fn persist(&self, user_id: &str, set: &CredentialSet) -> Res<()> {
        let Some(path) = self.user_path(user_id) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(set)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    async fn load_user(&self, user_id: &str) -> Option<CredentialSet> {
        let path = self.user_path(user_id)?;
        let json = async_fs::read_to_string(&path).await.ok()?;
        serde_json::from_str(&json).ok()
    }

    fn user_path(&self, user_id: &str) -> Option<PathBuf> {
        self.persist_dir
            .as_ref()
            .map(|dir| dir.join(format!("{user_id}.json")))
    }
}
