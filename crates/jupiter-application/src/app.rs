//! Application controller.
//!
//! Owns the navigation state machine and the session lifecycle, and decides
//! which polling leases are eligible to run for the active view:
//!
//! - authenticated at all -> unread-count lease (10 s)
//! - a peer thread is open -> that thread's refresh lease (3 s)
//!
//! Logout and a server-side session invalidation run the same teardown: all
//! leases cancelled, credentials cleared, view forced to `Unauthenticated`.

use crate::chat::AgentChatService;
use crate::direct::DirectMessageService;
use crate::knowledge::AgentKnowledgeService;
use crate::matches::MatchBoard;
use crate::notifications::NotificationCenter;
use crate::polling::{DM_POLL_PERIOD, PollingLease, PollingPool, UNREAD_POLL_PERIOD};
use jupiter_api::{ApiClient, wire::RegisterRequest};
use jupiter_core::error::Result;
use jupiter_core::session::{CredentialStore, UserSummary};
use jupiter_core::view::View;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Lease key of the unread-notification badge loop.
pub const UNREAD_LEASE_KEY: &str = "notifications:unread";

fn dm_lease_key(match_id: i64) -> String {
    format!("dm:{match_id}")
}

/// Coordinates navigation, session lifecycle and polling-lease ownership.
pub struct AppController {
    api: Arc<ApiClient>,
    store: Arc<dyn CredentialStore>,
    pool: PollingPool,
    view: Arc<RwLock<View>>,
    unread: Arc<AtomicU64>,
    dm_lease: Arc<StdMutex<Option<PollingLease>>>,
}

impl AppController {
    /// Builds the controller and installs the pipeline's unauthorized hook.
    ///
    /// When the store already holds a token from a previous run, the
    /// controller resumes authenticated at the primary chat view.
    pub async fn new(api: Arc<ApiClient>, store: Arc<dyn CredentialStore>) -> Arc<Self> {
        let controller = Arc::new(Self {
            api: Arc::clone(&api),
            store,
            pool: PollingPool::new(),
            view: Arc::new(RwLock::new(View::Unauthenticated)),
            unread: Arc::new(AtomicU64::new(0)),
            dm_lease: Arc::new(StdMutex::new(None)),
        });

        // Server-side session invalidation is a full reset, not a flag flip:
        // the pipeline has already cleared the store; here every lease dies
        // and the view state is discarded.
        //
        // A 401 can arrive on a polling tick, in which case this hook runs
        // inside the very fetch that `cancel_all` cancels. The teardown runs
        // on a detached task so that cancellation cannot drop it between its
        // first statement and the final view reset.
        {
            let pool = controller.pool.clone();
            let view = Arc::clone(&controller.view);
            let unread = Arc::clone(&controller.unread);
            let dm_lease = Arc::clone(&controller.dm_lease);
            api.set_unauthorized_hook(Arc::new(move || {
                let pool = pool.clone();
                let view = Arc::clone(&view);
                let unread = Arc::clone(&unread);
                let dm_lease = Arc::clone(&dm_lease);
                Box::pin(async move {
                    let teardown = tokio::spawn(async move {
                        pool.cancel_all();
                        drop_lease(&dm_lease);
                        unread.store(0, Ordering::SeqCst);
                        *view.write().await = View::Unauthenticated;
                    });
                    let _ = teardown.await;
                })
            }))
            .await;
        }

        if controller.store.is_active().await {
            tracing::info!("resuming persisted session");
            controller.enter_authenticated().await;
        }
        controller
    }

    /// Current view.
    pub async fn view(&self) -> View {
        self.view.read().await.clone()
    }

    /// Latest unread-notification count seen by the badge loop.
    pub fn unread(&self) -> u64 {
        self.unread.load(Ordering::SeqCst)
    }

    pub fn polling(&self) -> &PollingPool {
        &self.pool
    }

    // ── Session lifecycle ──

    pub async fn login(&self, username: &str, password: &str) -> Result<UserSummary> {
        let auth = self.api.login(username, password).await?;
        self.enter_authenticated().await;
        Ok(auth.user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserSummary> {
        let auth = self.api.register(request).await?;
        self.enter_authenticated().await;
        Ok(auth.user)
    }

    /// Explicit logout: every polling lease is cancelled before the view
    /// changes, and the stored session is removed.
    pub async fn logout(&self) {
        self.pool.cancel_all();
        drop_lease(&self.dm_lease);
        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear credential store on logout");
        }
        self.unread.store(0, Ordering::SeqCst);
        *self.view.write().await = View::Unauthenticated;
    }

    async fn enter_authenticated(&self) {
        *self.view.write().await = View::PrimaryChat;
        self.start_unread_lease();
    }

    fn start_unread_lease(&self) {
        let api = Arc::clone(&self.api);
        let unread = Arc::clone(&self.unread);
        self.pool
            .start(UNREAD_LEASE_KEY, UNREAD_POLL_PERIOD, move || {
                let api = Arc::clone(&api);
                let unread = Arc::clone(&unread);
                async move {
                    let count = api.unread_count().await?;
                    unread.store(count, Ordering::SeqCst);
                    Ok(())
                }
            });
    }

    // ── Navigation ──

    /// Switches between the top-level views. Leaving a peer thread releases
    /// its refresh lease. Peer threads are opened through
    /// [`Self::open_peer_thread`], which also starts their refresh lease; a
    /// raw `PeerThread` target here is redirected to the match list.
    pub async fn navigate(&self, target: View) {
        drop_lease(&self.dm_lease);
        let target = if target.is_peer_thread() {
            tracing::warn!("peer threads are opened via open_peer_thread; going to matches");
            View::Matches
        } else {
            target
        };
        *self.view.write().await = target;
    }

    /// Opens the direct-message thread for one match and starts its refresh
    /// lease (which also performs the initial load on its immediate first
    /// tick). A match id that cannot name a real thread falls back to the
    /// match list and returns no service.
    pub async fn open_peer_thread(
        &self,
        match_id: i64,
        peer_name: &str,
    ) -> Option<Arc<DirectMessageService>> {
        let target = View::open_peer_thread(match_id, peer_name);
        if !target.is_peer_thread() {
            tracing::warn!(match_id, "refusing to open peer thread; falling back to matches");
            self.navigate(View::Matches).await;
            return None;
        }

        let current_user_id = self
            .store
            .user()
            .await
            .map(|user| user.id)
            .unwrap_or_default();
        let service = Arc::new(DirectMessageService::new(
            Arc::clone(&self.api),
            match_id,
            current_user_id,
        ));

        let fetch_service = Arc::clone(&service);
        let lease = self
            .pool
            .start(dm_lease_key(match_id), DM_POLL_PERIOD, move || {
                let service = Arc::clone(&fetch_service);
                async move { service.reload().await.map(|_| ()) }
            });

        let previous = {
            let mut slot = lock(&self.dm_lease);
            slot.replace(lease)
        };
        if let Some(previous) = previous {
            previous.cancel();
        }

        *self.view.write().await = target;
        Some(service)
    }

    /// Back from a peer thread returns to the match list and releases the
    /// thread's lease; a no-op elsewhere. The transition itself is
    /// [`View::back`].
    pub async fn back(&self) {
        let mut view = self.view.write().await;
        if view.is_peer_thread() {
            drop_lease(&self.dm_lease);
        }
        *view = view.clone().back();
    }

    // ── Profile ──

    /// Updates display name/bio, then refreshes the cached user snapshot so
    /// the store stays consistent with the server.
    pub async fn update_profile(
        &self,
        display_name: Option<String>,
        bio: Option<String>,
    ) -> Result<UserSummary> {
        self.api.update_profile(display_name, bio).await?;
        let user = self.api.profile().await?;
        if let Some(token) = self.store.token().await {
            self.store.set_session(token, user.clone()).await?;
        }
        Ok(user)
    }

    // ── View services ──

    pub fn agent_chat(&self) -> AgentChatService {
        AgentChatService::new(Arc::clone(&self.api))
    }

    pub fn notifications(&self) -> NotificationCenter {
        NotificationCenter::new(Arc::clone(&self.api))
    }

    pub fn match_board(&self) -> MatchBoard {
        MatchBoard::new(Arc::clone(&self.api))
    }

    pub fn agent_knowledge(&self) -> AgentKnowledgeService {
        AgentKnowledgeService::new(Arc::clone(&self.api))
    }
}

fn drop_lease(slot: &StdMutex<Option<PollingLease>>) {
    if let Some(lease) = lock(slot).take() {
        lease.cancel();
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
