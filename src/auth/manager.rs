//! Session lifecycle management for the console.
//!
//! `SessionManager` owns the authenticated session: it rehydrates the
//! persisted record at startup, runs the login/logout protocol, and keeps two
//! background sentinels alive while a token is present - one watching the
//! token's expiry claim, one reconciling the cached permission flags against
//! the server. Consumers subscribe to the published [`SessionState`] and wire
//! the [`Notifier`]/[`Navigator`] collaborators to the UI shell.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::AuthApi;
use crate::shell::{NavTarget, Navigator, Notifier, NoticeLevel};

use super::credentials::CredentialStore;
use super::session::{Session, SessionStore};
use super::token;

/// Period of the token expiry check.
/// Short enough that a dead session is noticed promptly, cheap because the
/// check is a local decode.
const EXPIRY_CHECK_SECS: u64 = 15;

/// Period of the permission reconciliation check.
/// Each tick costs a profile fetch, so it runs at a quarter of the pace.
const PERMISSION_REFRESH_SECS: u64 = 60;

/// Default message shown after a user-initiated logout.
pub const MSG_LOGOUT_DEFAULT: &str = "Sesión cerrada con éxito";

/// Shown when the expiry sentinel closes the session.
pub const MSG_SESSION_EXPIRED: &str =
    "Tu sesión ha expirado. Por favor, inicia sesión de nuevo.";

/// Shown when the stored token cannot be decoded.
pub const MSG_SESSION_INVALID: &str =
    "Hubo un error con tu sesión. Por favor, inicia sesión de nuevo.";

/// Shown when the reconciliation sentinel picks up new permission flags.
pub const MSG_PERMISSIONS_UPDATED: &str = "Tus permisos han sido actualizados.";

/// Fallback login error when the server response carries no message.
pub const MSG_LOGIN_FALLBACK: &str = "Credenciales inválidas o error de conexión.";

/// Published session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup state while the persisted record has not been read yet.
    Uninitialized,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Uninitialized)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// The server rejected a login, or it could not be reached.
///
/// Carries the display message for the login form; the same message has
/// already been emitted through the [`Notifier`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoginError {
    pub message: String,
}

/// The two recurring background checks.
#[derive(Debug, Clone, Copy)]
enum Sentinel {
    Expiry,
    Permissions,
}

impl Sentinel {
    fn period(self) -> Duration {
        match self {
            Sentinel::Expiry => Duration::from_secs(EXPIRY_CHECK_SECS),
            Sentinel::Permissions => Duration::from_secs(PERMISSION_REFRESH_SECS),
        }
    }
}

struct Inner {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
    sentinels: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for handle in self
            .sentinels
            .lock()
            .expect("sentinel mutex poisoned")
            .drain(..)
        {
            handle.abort();
        }
    }
}

/// Owner of the authenticated session and its write path.
///
/// Cheap to clone; all clones share the same state. Callers are expected to
/// validate form input (non-empty credentials) before invoking [`login`];
/// the manager does not re-validate.
///
/// [`login`]: SessionManager::login
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                notifier,
                navigator,
                state,
                sentinels: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Snapshot of the current session, if authenticated.
    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().session().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Rehydrate the persisted session, once, at process start.
    ///
    /// A present, parseable record authenticates immediately (expiry is the
    /// sentinel's job); anything else leaves the manager unauthenticated,
    /// deleting a corrupt record along the way. Must be called from within a
    /// Tokio runtime - the sentinels are spawned here.
    pub fn initialize(&self) {
        match self.inner.store.load() {
            Some(session) => {
                debug!(user_id = session.id, "restored persisted session");
                self.inner
                    .state
                    .send_replace(SessionState::Authenticated(session));
                self.start_sentinels();
            }
            None => {
                self.inner.state.send_replace(SessionState::Unauthenticated);
            }
        }
    }

    /// Authenticate against the server and open a session.
    ///
    /// On success the session is persisted, the sentinels start, a welcome
    /// notification fires and the shell is asked to navigate to the root.
    /// On failure nothing changes; the server's message (or a generic
    /// fallback) is notified and returned.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<(), LoginError> {
        match self.inner.api.login(username, password).await {
            Ok(response) => {
                let session = Session::from_login(response.access_token, response.user);
                // In-memory state is authoritative; a failed durable write is
                // logged and accepted.
                if let Err(e) = self.inner.store.save(&session) {
                    warn!(error = %e, "failed to persist session, continuing in memory");
                }
                if remember {
                    if let Err(e) = CredentialStore::remember(username, password) {
                        warn!(error = %e, "failed to store remembered credentials");
                    }
                }
                let first_name = session.first_name.clone();
                info!(user_id = session.id, "login successful");
                self.inner
                    .state
                    .send_replace(SessionState::Authenticated(session));
                self.start_sentinels();
                self.inner
                    .notifier
                    .notify(NoticeLevel::Success, &format!("¡Bienvenido, {first_name}!"));
                self.inner.navigator.navigate(NavTarget::Root);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "login failed");
                let message = e
                    .display_message()
                    .unwrap_or(MSG_LOGIN_FALLBACK)
                    .to_string();
                self.inner.notifier.notify(NoticeLevel::Error, &message);
                Err(LoginError { message })
            }
        }
    }

    /// Close the session, with `message` shown to the user.
    ///
    /// The server logout is best effort: an unreachable endpoint is logged and
    /// the local logout proceeds regardless. Idempotent - calling with no
    /// active session still clears storage and navigates to the login
    /// boundary, without contacting the server.
    pub async fn logout(&self, message: Option<&str>) {
        if let Some(session) = self.session() {
            if let Err(e) = self.inner.api.logout(&session.token).await {
                warn!(error = %e, "logout endpoint unreachable, proceeding with local logout");
            }
        }
        // May abort the sentinel task we are running on; cancellation only
        // lands at the next await, after the cleanup below completes.
        self.stop_sentinels();
        self.inner.state.send_replace(SessionState::Unauthenticated);
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
        self.inner
            .notifier
            .notify(NoticeLevel::Info, message.unwrap_or(MSG_LOGOUT_DEFAULT));
        self.inner.navigator.navigate(NavTarget::Login);
    }

    // =========================================================================
    // Sentinels
    // =========================================================================

    fn start_sentinels(&self) {
        let mut sentinels = self
            .inner
            .sentinels
            .lock()
            .expect("sentinel mutex poisoned");
        for handle in sentinels.drain(..) {
            handle.abort();
        }
        for kind in [Sentinel::Expiry, Sentinel::Permissions] {
            let inner = Arc::downgrade(&self.inner);
            sentinels.push(tokio::spawn(Self::run_sentinel(inner, kind)));
        }
    }

    fn stop_sentinels(&self) {
        for handle in self
            .inner
            .sentinels
            .lock()
            .expect("sentinel mutex poisoned")
            .drain(..)
        {
            handle.abort();
        }
    }

    /// Drive one recurring check until the session ends or the manager is
    /// dropped.
    ///
    /// The tick body is awaited inside the loop, so a slow server delays the
    /// next tick instead of overlapping it. The task holds only a weak
    /// reference; dropping the manager ends it.
    async fn run_sentinel(inner: Weak<Inner>, kind: Sentinel) {
        let Some(mut rx) = inner.upgrade().map(|i| i.state.subscribe()) else {
            return;
        };
        let mut ticker = interval(kind.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; consume that so the first real check
        // happens one full period after the session opens.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(inner) = inner.upgrade() else { break };
                    let manager = SessionManager { inner };
                    if !manager.is_authenticated() {
                        break;
                    }
                    match kind {
                        Sentinel::Expiry => manager.expiry_tick().await,
                        Sentinel::Permissions => manager.reconcile_tick().await,
                    }
                }
                changed = rx.changed() => {
                    match changed {
                        Ok(()) if rx.borrow().is_authenticated() => {}
                        _ => break,
                    }
                }
            }
        }
    }

    /// One pass of the expiry sentinel.
    ///
    /// Decodes the token's expiry claim (unverified, a trust-the-server
    /// hint). An expired token notifies the server best-effort and closes the
    /// session; an undecodable one closes it immediately.
    pub(crate) async fn expiry_tick(&self) {
        let Some(session) = self.session() else { return };
        match token::peek_claims(&session.token) {
            Ok(claims) if claims.is_expired() => {
                warn!(user_id = session.id, "token expired, forcing logout");
                if let Err(e) = self.inner.api.force_logout(&session.token, session.id).await {
                    warn!(error = %e, "force logout call failed");
                }
                self.logout(Some(MSG_SESSION_EXPIRED)).await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "stored token is undecodable, closing session");
                self.logout(Some(MSG_SESSION_INVALID)).await;
            }
        }
    }

    /// One pass of the permission reconciliation sentinel.
    ///
    /// A failed profile fetch is treated as transient - logged, session
    /// untouched. Detected drift in the two access flags is merged into the
    /// session, persisted, and notified, with no logout and no navigation.
    pub(crate) async fn reconcile_tick(&self) {
        let Some(session) = self.session() else { return };
        let fresh = match self.inner.api.fetch_profile(&session.token).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "profile refresh failed, keeping session");
                return;
            }
        };
        if !session.permissions_differ(&fresh) {
            return;
        }
        info!(user_id = session.id, "permission drift detected, refreshing local session");
        let mut merged = None;
        self.inner.state.send_modify(|state| {
            if let SessionState::Authenticated(current) = state {
                // A fresh login may have swapped the session while the fetch
                // was in flight; only merge into the session it was for.
                if current.token == session.token {
                    current.apply_profile(&fresh);
                    merged = Some(current.clone());
                }
            }
        });
        if let Some(updated) = merged {
            if let Err(e) = self.inner.store.save(&updated) {
                warn!(error = %e, "failed to persist refreshed session");
            }
            self.inner
                .notifier
                .notify(NoticeLevel::Info, MSG_PERMISSIONS_UPDATED);
        }
    }
}
