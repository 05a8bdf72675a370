// ── Non-blocking writes ──
//
// `Lab::submit` hands back a `PendingWrite` immediately. Awaiting it is
// optional; failures are also published as `WriteFailure`s so a shell
// can surface them without holding on to every future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::command::CommandResult;
use crate::error::CoreError;

/// A write that failed after being submitted.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    /// What was attempted, e.g. `"update vendor"`.
    pub action: &'static str,
    pub error: Arc<CoreError>,
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not {}: {}", self.action, self.error)
    }
}

/// Handle to a submitted write.
///
/// Resolves to the command result. Dropping it does not cancel the write.
#[must_use = "dropping a PendingWrite ignores its result; failures still reach write_failures()"]
pub struct PendingWrite {
    rx: oneshot::Receiver<Result<CommandResult, Arc<CoreError>>>,
}

impl PendingWrite {
    pub(crate) fn new(rx: oneshot::Receiver<Result<CommandResult, Arc<CoreError>>>) -> Self {
        Self { rx }
    }
}

impl Future for PendingWrite {
    type Output = Result<CommandResult, Arc<CoreError>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Arc::new(CoreError::Disconnected))),
            Poll::Pending => Poll::Pending,
        }
    }
}
