//! Shared application state: store handle, degraded flag and sessions.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::{
    sync::{RwLock, watch},
    time::Instant,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::result_store::ResultStore,
    error::ServiceError,
    leaderboard::AdminSession,
};

/// Shared handle passed to every route and service.
pub type SharedState = Arc<AppState>;

/// How long a login token stays valid without an explicit logout.
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

struct SessionEntry {
    session: AdminSession,
    opened_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        self.opened_at.elapsed() >= SESSION_TTL
    }
}

/// Central application state holding the store handle and admin sessions.
pub struct AppState {
    config: AppConfig,
    result_store: RwLock<Option<Arc<dyn ResultStore>>>,
    sessions: DashMap<String, SessionEntry>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            result_store: RwLock::new(None),
            sessions: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    /// Configuration the server was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current result store, if one is installed.
    pub async fn result_store(&self) -> Option<Arc<dyn ResultStore>> {
        let guard = self.result_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current result store or [`ServiceError::Degraded`] while none is installed.
    pub async fn require_result_store(&self) -> Result<Arc<dyn ResultStore>, ServiceError> {
        self.result_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new result store implementation and leave degraded mode.
    pub async fn set_result_store(&self, store: Arc<dyn ResultStore>) {
        {
            let mut guard = self.result_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current result store and enter degraded mode.
    pub async fn clear_result_store(&self) {
        {
            let mut guard = self.result_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Register an admitted session and return its opaque token.
    ///
    /// Tokens expire after [`SESSION_TTL`]; expired entries are dropped here
    /// and on lookup, so abandoned logins do not accumulate.
    pub fn open_session(&self, session: AdminSession) -> String {
        self.prune_sessions();
        let token = Uuid::new_v4().simple().to_string();
        if let AdminSession::Admitted { admin_id } = &session {
            info!(%admin_id, "admin session opened");
        }
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                session,
                opened_at: Instant::now(),
            },
        );
        token
    }

    /// Session bound to `token`; unknown or expired tokens are anonymous.
    pub fn session(&self, token: &str) -> AdminSession {
        if self
            .sessions
            .remove_if(token, |_, entry| entry.is_expired())
            .is_some()
        {
            debug!("admin session expired");
            return AdminSession::default();
        }
        self.sessions
            .get(token)
            .map(|entry| entry.session.clone())
            .unwrap_or_default()
    }

    /// Forget `token`. Returns whether it was known.
    pub fn close_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Number of tokens currently held, expired ones included until pruned.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn prune_sessions(&self) {
        self.sessions.retain(|_, entry| !entry.is_expired());
    }
}
