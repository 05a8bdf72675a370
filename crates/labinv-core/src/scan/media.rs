// ── Camera seam ──

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

/// What the stream is for. Scan mode favors the rear camera at low
/// resolution; capture mode favors a single high-resolution still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMode {
    Scan,
    Capture,
}

/// One decoded video frame (or still image).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera access is not supported on this device")]
    Unsupported,

    #[error("camera permission denied")]
    PermissionDenied,

    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Acquire a live stream. Each call yields a new, independent handle.
    async fn open(&self, mode: CameraMode) -> Result<Arc<dyn MediaStream>, CameraError>;
}

/// A live camera stream. Tracks stay live until [`stop_tracks`](Self::stop_tracks).
#[async_trait]
pub trait MediaStream: Send + Sync {
    async fn grab_frame(&self) -> Result<Frame, CameraError>;

    /// Stop every track. Idempotent.
    fn stop_tracks(&self);

    fn active_tracks(&self) -> usize;
}
