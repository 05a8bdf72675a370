// ── Session resolution ──
//
// Combines the identity provider's auth-state stream with a per-user
// profile subscription into one observable `SessionState`.
//
// Ordering: identity event -> (only for a signed-in user) profile
// subscription -> first profile snapshot -> Authenticated. A newer
// identity event drops the previous profile subscription before anything
// else happens, so a stale profile can never be attributed to a new user.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::Profile;

/// Boxed, sendable stream used at the collaborator seams.
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// One auth-state report: a signed-in user, nobody, or a failure.
pub type IdentityEvent = Result<Option<AuthUser>, Arc<CoreError>>;

/// One profile snapshot: the document, its absence, or a failure.
pub type ProfileEvent = Result<Option<Profile>, Arc<CoreError>>;

// ── Collaborators ────────────────────────────────────────────────

/// Source of auth-state changes.
pub trait IdentityProvider: Send + Sync {
    /// Subscribe to auth state. The first item is the current state once
    /// the provider has resolved it.
    fn auth_state(&self) -> BoxStream<IdentityEvent>;
}

/// Source of live profile snapshots for one user.
pub trait ProfileSource: Send + Sync {
    /// Subscribe to `users/{uid}`. Dropping the stream unsubscribes.
    fn watch_profile(&self, uid: &str) -> BoxStream<ProfileEvent>;
}

// ── Types ────────────────────────────────────────────────────────

/// Signed-in identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Combined auth + profile status.
///
/// Built only through the named constructors, so `user` and `profile`
/// are present only when `status` is `Authenticated`.
#[derive(Clone)]
pub struct SessionState {
    status: SessionStatus,
    user: Option<AuthUser>,
    profile: Option<Profile>,
    error: Option<Arc<CoreError>>,
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            user: None,
            profile: None,
            error: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            ..Self::loading()
        }
    }

    /// Signed in; `profile` is `None` when the user has no profile document.
    pub fn authenticated(user: AuthUser, profile: Option<Profile>) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
            profile,
            error: None,
        }
    }

    /// Identity or profile failure. Treated as signed out.
    pub fn failed(error: Arc<CoreError>) -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
            profile: None,
            error: Some(error),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn error(&self) -> Option<&CoreError> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

impl PartialEq for SessionState {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.user == other.user
            && self.profile == other.profile
            && self.error.as_ref().map(ToString::to_string)
                == other.error.as_ref().map(ToString::to_string)
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("status", &self.status)
            .field("uid", &self.user.as_ref().map(|u| u.uid.as_str()))
            .field("has_profile", &self.profile.is_some())
            .field("error", &self.error.as_ref().map(ToString::to_string))
            .finish()
    }
}

// ── Identity hub ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum HubState {
    Pending,
    Resolved(Option<AuthUser>),
    Failed(Arc<CoreError>),
}

/// Watch-backed [`IdentityProvider`] fed by whoever performs sign-in.
///
/// Starts unresolved; subscribers see nothing until the first
/// [`publish`](Self::publish) and then always the latest state.
#[derive(Debug, Clone)]
pub struct IdentityHub {
    tx: Arc<watch::Sender<HubState>>,
}

impl Default for IdentityHub {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityHub {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(HubState::Pending);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, user: Option<AuthUser>) {
        self.tx.send_replace(HubState::Resolved(user));
    }

    pub fn publish_error(&self, error: CoreError) {
        self.tx.send_replace(HubState::Failed(Arc::new(error)));
    }

    /// The resolved user, if any.
    pub fn current(&self) -> Option<AuthUser> {
        match &*self.tx.borrow() {
            HubState::Resolved(user) => user.clone(),
            HubState::Pending | HubState::Failed(_) => None,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl IdentityProvider for IdentityHub {
    fn auth_state(&self) -> BoxStream<IdentityEvent> {
        let stream = WatchStream::new(self.tx.subscribe()).filter_map(|state| async move {
            match state {
                HubState::Pending => None,
                HubState::Resolved(user) => Some(Ok(user)),
                HubState::Failed(e) => Some(Err(e)),
            }
        });
        Box::pin(stream)
    }
}

// ── Resolver ─────────────────────────────────────────────────────

/// Background task publishing the combined [`SessionState`].
///
/// Holds exactly one identity subscription and at most one profile
/// subscription. Both are released by [`shutdown`](Self::shutdown) or
/// when the resolver is dropped.
pub struct SessionResolver {
    state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SessionResolver {
    /// Start resolving. Must be called within a Tokio runtime.
    pub fn spawn(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileSource>) -> Self {
        let (tx, state) = watch::channel(SessionState::loading());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(resolve_task(identity, profiles, tx, cancel.clone()));
        Self {
            state,
            cancel,
            handle: Some(handle),
        }
    }

    /// Subscribe to session state. The receiver starts at the current state.
    pub fn observe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Stop the task and wait for both subscriptions to be dropped.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SessionResolver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ProfileSubscription {
    user: AuthUser,
    stream: BoxStream<ProfileEvent>,
}

/// Next item from the live profile subscription; pends forever without one.
async fn next_profile(sub: &mut Option<ProfileSubscription>) -> Option<ProfileEvent> {
    match sub {
        Some(s) => s.stream.next().await,
        None => std::future::pending().await,
    }
}

/// A source that closes before resolving leaves nothing to wait for.
fn fail_if_loading(tx: &watch::Sender<SessionState>) {
    tx.send_if_modified(|state| {
        if state.is_loading() {
            *state = SessionState::failed(Arc::new(CoreError::Disconnected));
            true
        } else {
            false
        }
    });
}

async fn resolve_task(
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileSource>,
    tx: watch::Sender<SessionState>,
    cancel: CancellationToken,
) {
    let mut auth = identity.auth_state();
    let mut profile: Option<ProfileSubscription> = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = auth.next() => {
                let Some(event) = event else {
                    debug!("identity stream ended");
                    fail_if_loading(&tx);
                    break;
                };
                // Supersede whatever subscription belonged to the previous event.
                profile = None;
                match event {
                    Ok(None) => {
                        debug!("session: signed out");
                        tx.send_replace(SessionState::unauthenticated());
                    }
                    Ok(Some(user)) => {
                        debug!(uid = %user.uid, "session: identity resolved, awaiting profile");
                        let stream = profiles.watch_profile(&user.uid);
                        profile = Some(ProfileSubscription { user, stream });
                        tx.send_replace(SessionState::loading());
                    }
                    Err(e) => {
                        warn!(error = %e, "session: identity error");
                        tx.send_replace(SessionState::failed(e));
                    }
                }
            }
            snapshot = next_profile(&mut profile) => {
                match snapshot {
                    Some(Ok(doc)) => {
                        if let Some(sub) = profile.as_ref() {
                            tx.send_replace(SessionState::authenticated(sub.user.clone(), doc));
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "session: profile error");
                        profile = None;
                        tx.send_replace(SessionState::failed(e));
                    }
                    None => {
                        debug!("profile stream ended");
                        profile = None;
                        fail_if_loading(&tx);
                    }
                }
            }
        }
    }
}
