// ── Route gate ──
//
// Decides, for every page, whether to show a loader, redirect, or render
// the page. `RouteGate::decide` is a pure function; `RouteWatcher` re-runs
// it whenever the session, the device class, or the current path changes.

use std::fmt;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::device::DeviceClass;
use crate::session::{SessionState, SessionStatus};

/// What the shell should do with the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    ShowLoader,
    RedirectTo(String),
    RenderChildren,
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowLoader => f.write_str("show loader"),
            Self::RedirectTo(path) => write!(f, "redirect to {path}"),
            Self::RenderChildren => f.write_str("render"),
        }
    }
}

/// Route table the gate decides against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    pub login_path: String,
    /// Only page a mobile device may open outside the shared set.
    pub mobile_only_path: String,
    /// Where desktop devices land when they open the mobile-only page.
    pub desktop_landing_path: String,
    /// Pages open to both device classes (matched per path segment).
    pub shared_prefixes: Vec<String>,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self {
            login_path: "/".into(),
            mobile_only_path: "/scan".into(),
            desktop_landing_path: "/dashboard".into(),
            shared_prefixes: ["/inventory", "/vendors", "/literature-review", "/settings"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RouteGate {
    /// Evaluate the decision table for one combination of inputs.
    ///
    /// The session is checked first, so a signed-out (or errored) session
    /// always goes to login whatever the device class.
    pub fn decide(&self, session: &SessionState, device: DeviceClass, path: &str) -> RouteDecision {
        match session.status() {
            SessionStatus::Loading => return RouteDecision::ShowLoader,
            SessionStatus::Unauthenticated => {
                return RouteDecision::RedirectTo(self.login_path.clone());
            }
            SessionStatus::Authenticated => {}
        }

        let path = normalize(path);
        let on_mobile_page = path == normalize(&self.mobile_only_path);

        match device {
            DeviceClass::Unknown => RouteDecision::ShowLoader,
            DeviceClass::Desktop if on_mobile_page => {
                RouteDecision::RedirectTo(self.desktop_landing_path.clone())
            }
            DeviceClass::Mobile if !on_mobile_page && !self.is_shared(path) => {
                RouteDecision::RedirectTo(self.mobile_only_path.clone())
            }
            DeviceClass::Desktop | DeviceClass::Mobile => RouteDecision::RenderChildren,
        }
    }

    /// True when `path` is one of the shared prefixes or below one.
    pub fn is_shared(&self, path: &str) -> bool {
        let path = normalize(path);
        self.shared_prefixes
            .iter()
            .any(|prefix| under_prefix(path, normalize(prefix)))
    }
}

/// Strip query, fragment and trailing slashes (`"/"` stays `"/"`).
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Segment-aware prefix test: `/inventory` covers `/inventory/42`
/// but not `/inventory-archive`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

// ── Reactive evaluation ──────────────────────────────────────────

/// Re-evaluates the gate on every input change.
///
/// Only the newest decision is kept; consumers that fall behind skip the
/// superseded ones.
pub struct RouteWatcher {
    decision: watch::Receiver<RouteDecision>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RouteWatcher {
    pub fn spawn(
        gate: RouteGate,
        mut session: watch::Receiver<SessionState>,
        mut device: watch::Receiver<DeviceClass>,
        mut path: watch::Receiver<String>,
    ) -> Self {
        let initial = gate.decide(
            &session.borrow_and_update(),
            *device.borrow_and_update(),
            &path.borrow_and_update(),
        );
        let (tx, decision) = watch::channel(initial);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    r = session.changed() => if r.is_err() { break },
                    r = device.changed() => if r.is_err() { break },
                    r = path.changed() => if r.is_err() { break },
                }

                let next = gate.decide(
                    &session.borrow_and_update(),
                    *device.borrow_and_update(),
                    &path.borrow_and_update(),
                );
                tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        debug!(decision = %next, "route decision changed");
                        *current = next;
                        true
                    }
                });
            }
        });

        Self {
            decision,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn observe(&self) -> watch::Receiver<RouteDecision> {
        self.decision.clone()
    }

    pub fn current(&self) -> RouteDecision {
        self.decision.borrow().clone()
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RouteWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
