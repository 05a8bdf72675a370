//! Keyboard-wedge barcode scanner support.
//!
//! USB barcode scanners present themselves as keyboards: each scan is the
//! code followed by Enter. [`WedgeCamera`] turns input lines into frames
//! and [`WedgeDetector`] "decodes" a frame back into the line it carries,
//! which lets the core scan loop drive a terminal session unchanged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, Notify, mpsc};
use tracing::debug;

use labinv_core::{
    BarcodeDetector, Camera, CameraError, CameraMode, CoreError, DetectedBarcode, Frame,
    MediaStream,
};

const LINE_BUFFER: usize = 32;

/// Line-fed "camera". Every open shares the same input.
pub struct WedgeCamera {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
    eof: Arc<Notify>,
}

impl WedgeCamera {
    /// Read scans from stdin.
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        tokio::spawn(async move {
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            debug!("scanner input closed");
        });
        Self {
            lines: Arc::new(Mutex::new(rx)),
            eof: Arc::new(Notify::new()),
        }
    }

    /// Resolves once the input has ended and every line was consumed.
    pub async fn closed(&self) {
        self.eof.notified().await;
    }
}

#[async_trait]
impl Camera for WedgeCamera {
    async fn open(&self, mode: CameraMode) -> Result<Arc<dyn MediaStream>, CameraError> {
        match mode {
            CameraMode::Scan => Ok(Arc::new(WedgeStream {
                lines: Arc::clone(&self.lines),
                eof: Arc::clone(&self.eof),
                live: AtomicBool::new(true),
            })),
            CameraMode::Capture => Err(CameraError::Unsupported),
        }
    }
}

struct WedgeStream {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
    eof: Arc<Notify>,
    live: AtomicBool,
}

#[async_trait]
impl MediaStream for WedgeStream {
    async fn grab_frame(&self) -> Result<Frame, CameraError> {
        if !self.live.load(Ordering::SeqCst) {
            return Err(CameraError::Unavailable("scanner stream stopped".into()));
        }
        let next = self.lines.lock().await.recv().await;
        match next {
            Some(line) => Ok(Frame {
                width: u32::try_from(line.len()).unwrap_or(u32::MAX),
                height: 1,
                data: Bytes::from(line),
            }),
            None => {
                // Input is over; park until the loop is stopped.
                self.eof.notify_one();
                std::future::pending().await
            }
        }
    }

    fn stop_tracks(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.live.load(Ordering::SeqCst))
    }
}

/// Reads the scanned text straight out of a wedge frame.
#[derive(Debug, Default)]
pub struct WedgeDetector;

#[async_trait]
impl BarcodeDetector for WedgeDetector {
    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, CoreError> {
        let text = String::from_utf8_lossy(&frame.data);
        Ok(text
            .split_whitespace()
            .map(DetectedBarcode::new)
            .collect())
    }
}
