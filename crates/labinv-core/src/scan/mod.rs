// ── Scan acquisition loop ──
//
// Owns the camera stream while scanning. A background task polls the
// barcode detector on a fixed interval, hands the first decoded value to
// the item lookup, and either presents the match or resumes scanning.
//
//   Idle ──start──▶ Scanning ──code──▶ Resolving ──match──▶ Matched
//                      ▲                   │                   │
//                      └── not found/error ┘◀──── dismiss ─────┘
//
// `stop()` (or drop) from any phase stops every media track and returns
// to Idle.

pub mod detector;
pub mod media;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use detector::{BarcodeDetector, BarcodeFormat, DetectedBarcode, SCAN_FORMATS};
pub use media::{Camera, CameraError, CameraMode, Frame, MediaStream};

use crate::error::CoreError;
use crate::model::InventoryItem;
use crate::notify::{Notification, Notifier};
use crate::services::ItemLookup;

/// Detector polling period used when none is configured.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Scanning,
    /// A code was decoded and is being looked up.
    Resolving { code: String },
    /// Lookup found an item; polling is paused until [`ScanLoop::dismiss`].
    Matched(Arc<InventoryItem>),
}

/// Observable state of the loop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanSession {
    pub phase: ScanPhase,
    pub last_detected: Option<String>,
}

impl ScanSession {
    pub fn is_scanning(&self) -> bool {
        self.phase == ScanPhase::Scanning
    }

    pub fn matched(&self) -> Option<&InventoryItem> {
        match &self.phase {
            ScanPhase::Matched(item) => Some(item),
            _ => None,
        }
    }
}

/// Barcode scanning state machine.
///
/// Not `Clone`: the loop is the single owner of its camera stream.
pub struct ScanLoop {
    inner: Arc<ScanInner>,
}

struct ScanInner {
    camera: Arc<dyn Camera>,
    detector: Option<Arc<dyn BarcodeDetector>>,
    lookup: Arc<dyn ItemLookup>,
    notifier: Arc<dyn Notifier>,
    interval_ms: AtomicU64,
    state: watch::Sender<ScanSession>,
    active: Mutex<Option<ActiveScan>>,
    generation: AtomicU64,
    warned: AtomicBool,
}

impl ScanInner {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::SeqCst))
    }
}

/// Whole milliseconds, at least one; a zero period would spin.
fn millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1)
}

struct ActiveScan {
    generation: u64,
    stream: Arc<dyn MediaStream>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ScanLoop {
    /// `detector` is `None` on devices without barcode detection.
    pub fn new(
        camera: Arc<dyn Camera>,
        detector: Option<Arc<dyn BarcodeDetector>>,
        lookup: Arc<dyn ItemLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(ScanSession::default());
        Self {
            inner: Arc::new(ScanInner {
                camera,
                detector,
                lookup,
                notifier,
                interval_ms: AtomicU64::new(millis(DEFAULT_SCAN_INTERVAL)),
                state,
                active: Mutex::new(None),
                generation: AtomicU64::new(0),
                warned: AtomicBool::new(false),
            }),
        }
    }

    /// Override the polling period. Applies from the next scanning period.
    #[must_use]
    pub fn with_interval(self, interval: Duration) -> Self {
        self.inner.interval_ms.store(millis(interval), Ordering::SeqCst);
        self
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval()
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn observe(&self) -> watch::Receiver<ScanSession> {
        self.inner.state.subscribe()
    }

    pub fn session(&self) -> ScanSession {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> ScanPhase {
        self.inner.state.borrow().phase.clone()
    }

    /// Live tracks on the stream this loop holds (0 when idle).
    pub fn active_tracks(&self) -> usize {
        self.inner
            .lock_active()
            .as_ref()
            .map_or(0, |a| a.stream.active_tracks())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Acquire the camera and begin polling.
    ///
    /// A no-op when already running. Without a detector this never leaves
    /// `Idle` and warns once per loop.
    pub async fn start(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        let Some(detector) = inner.detector.clone() else {
            if !inner.warned.swap(true, Ordering::SeqCst) {
                inner.notifier.notify(Notification::warning(
                    "Unsupported Browser",
                    "Barcode detection is not supported in your browser.",
                ));
            }
            return Err(CoreError::CapabilityMissing {
                capability: "Barcode detection".into(),
            });
        };

        if inner.lock_active().is_some() {
            return Ok(());
        }

        let stream = match inner.camera.open(CameraMode::Scan).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "camera acquisition failed");
                inner.notify_camera_error(&e);
                inner.set_idle();
                return Err(CoreError::CameraUnavailable {
                    reason: e.to_string(),
                });
            }
        };

        let mut active = inner.lock_active();
        if active.is_some() {
            // Lost a race with a concurrent start().
            stream.stop_tracks();
            return Ok(());
        }

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        inner.state.send_modify(|s| s.phase = ScanPhase::Scanning);
        let task = tokio::spawn(poll_task(
            Arc::clone(inner),
            detector,
            Arc::clone(&stream),
            cancel.clone(),
            generation,
        ));
        *active = Some(ActiveScan {
            generation,
            stream,
            cancel,
            task,
        });
        drop(active);

        info!(interval_ms = inner.interval().as_millis(), "scanning started");
        Ok(())
    }

    /// Close the match dialog and resume scanning. Returns `false` when
    /// there was no match to dismiss.
    pub fn dismiss(&self) -> bool {
        self.inner.state.send_if_modified(|s| {
            if matches!(s.phase, ScanPhase::Matched(_)) {
                s.phase = ScanPhase::Scanning;
                true
            } else {
                false
            }
        })
    }

    /// Stop polling, stop every media track, go `Idle`. Safe in any phase.
    pub fn stop(&self) {
        if let Some(active) = self.inner.take_active(None) {
            active.task.abort();
        }
    }

    /// Like [`stop`](Self::stop) but waits for the polling task to exit.
    pub async fn shutdown(&self) {
        if let Some(active) = self.inner.take_active(None) {
            let _ = active.task.await;
        }
    }

    /// Take one still in capture mode.
    ///
    /// The scan stream is released first so two camera handles are never
    /// held at once. Scanning is not resumed afterwards.
    pub async fn capture_still(&self) -> Result<Frame, CoreError> {
        self.stop();
        let stream = self
            .inner
            .camera
            .open(CameraMode::Capture)
            .await
            .map_err(|e| {
                self.inner.notify_camera_error(&e);
                CoreError::CameraUnavailable {
                    reason: e.to_string(),
                }
            })?;
        let frame = stream.grab_frame().await;
        stream.stop_tracks();
        frame.map_err(|e| CoreError::CameraUnavailable {
            reason: e.to_string(),
        })
    }
}

impl Drop for ScanLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ScanInner {
    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveScan>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the current scan (only if it is `generation`, when given).
    fn take_active(&self, generation: Option<u64>) -> Option<ActiveScan> {
        let active = {
            let mut guard = self.lock_active();
            if generation.is_some_and(|g| guard.as_ref().is_some_and(|a| a.generation != g)) {
                return None;
            }
            guard.take()
        }?;
        active.cancel.cancel();
        active.stream.stop_tracks();
        self.set_idle();
        debug!(generation = active.generation, "scan released");
        Some(active)
    }

    fn set_idle(&self) {
        self.state.send_if_modified(|s| {
            if s.phase == ScanPhase::Idle {
                false
            } else {
                s.phase = ScanPhase::Idle;
                true
            }
        });
    }

    /// `Scanning → Resolving`. Returns `false` (discarding the code) in
    /// any other phase.
    fn begin_resolving(&self, cancel: &CancellationToken, code: &str) -> bool {
        self.state.send_if_modified(|s| {
            if cancel.is_cancelled() || s.phase != ScanPhase::Scanning {
                return false;
            }
            s.phase = ScanPhase::Resolving { code: code.to_owned() };
            s.last_detected = Some(code.to_owned());
            true
        })
    }

    /// `Resolving → next`, unless the scan was stopped meanwhile.
    fn finish_resolving(&self, cancel: &CancellationToken, next: ScanPhase) {
        self.state.send_if_modified(|s| {
            if cancel.is_cancelled() || !matches!(s.phase, ScanPhase::Resolving { .. }) {
                return false;
            }
            s.phase = next;
            true
        });
    }

    fn notify_camera_error(&self, error: &CameraError) {
        let notification = match error {
            CameraError::Unsupported => Notification::error(
                "Unsupported Browser",
                "Your browser does not support camera access.",
            ),
            CameraError::PermissionDenied | CameraError::Unavailable(_) => Notification::error(
                "Camera Access Denied",
                "Please enable camera permissions in your browser settings to use this feature.",
            ),
        };
        self.notifier.notify(notification);
    }
}

// ── Polling task ─────────────────────────────────────────────────────

async fn until_scanning(rx: &mut watch::Receiver<ScanSession>) -> bool {
    rx.wait_for(ScanSession::is_scanning).await.is_ok()
}

/// Grab one frame and return the first decoded value in it.
async fn detect_once(
    stream: &dyn MediaStream,
    detector: &dyn BarcodeDetector,
) -> Result<Option<String>, CoreError> {
    let frame = stream
        .grab_frame()
        .await
        .map_err(|e| CoreError::CameraUnavailable {
            reason: e.to_string(),
        })?;
    let codes = detector.detect(&frame).await?;
    if codes.len() > 1 {
        debug!(count = codes.len(), "several codes in one frame, using the first");
    }
    Ok(codes.into_iter().next().map(|c| c.raw_value))
}

async fn poll_task(
    inner: Arc<ScanInner>,
    detector: Arc<dyn BarcodeDetector>,
    stream: Arc<dyn MediaStream>,
    cancel: CancellationToken,
    generation: u64,
) {
    let mut state = inner.state.subscribe();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            ok = until_scanning(&mut state) => if !ok { return },
        }

        // Fresh interval per scanning period.
        let mut ticker = tokio::time::interval(inner.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        let code = loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let detected = tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                r = detect_once(stream.as_ref(), detector.as_ref()) => r,
            };

            match detected {
                Ok(Some(code)) => {
                    if inner.begin_resolving(&cancel, &code) {
                        break code;
                    }
                    debug!(%code, "detection discarded, not scanning");
                }
                Ok(None) => {}
                Err(e) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    warn!(error = %e, "barcode detection failed, releasing camera");
                    inner.notifier.notify(Notification::error(
                        "Error",
                        "Barcode detection failed. Start scanning again to retry.",
                    ));
                    inner.take_active(Some(generation));
                    return;
                }
            }
        };

        debug!(%code, "resolving barcode");
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            r = inner.lookup.find_by_barcode(&code) => r,
        };

        match outcome {
            Ok(Some(item)) => {
                info!(%code, item = %item.id, "barcode matched");
                inner.finish_resolving(&cancel, ScanPhase::Matched(Arc::new(item)));
            }
            Ok(None) => {
                inner.notifier.notify(Notification::error(
                    "Not Found",
                    format!("No inventory item found with barcode: {code}"),
                ));
                inner.finish_resolving(&cancel, ScanPhase::Scanning);
            }
            Err(e) => {
                warn!(%code, error = %e, "item lookup failed");
                inner.notifier.notify(Notification::error(
                    "Error",
                    "Could not fetch item details.",
                ));
                inner.finish_resolving(&cancel, ScanPhase::Scanning);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::sync::Notify;

    use super::*;
    use crate::model::EntityId;

    // ── Fakes ────────────────────────────────────────────────────────

    struct FakeStream {
        tracks: AtomicUsize,
        live: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MediaStream for FakeStream {
        async fn grab_frame(&self) -> Result<Frame, CameraError> {
            Ok(Frame {
                width: 640,
                height: 480,
                data: Bytes::from_static(b"frame"),
            })
        }

        fn stop_tracks(&self) {
            if self.tracks.swap(0, Ordering::SeqCst) > 0 {
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }

        fn active_tracks(&self) -> usize {
            self.tracks.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct FakeCamera {
        fail: Option<CameraError>,
        opens: Mutex<Vec<CameraMode>>,
        live: Arc<AtomicUsize>,
        peak: AtomicUsize,
    }

    impl FakeCamera {
        fn failing(error: CameraError) -> Self {
            Self {
                fail: Some(error),
                ..Self::default()
            }
        }

        fn opens(&self) -> Vec<CameraMode> {
            self.opens.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Camera for FakeCamera {
        async fn open(&self, mode: CameraMode) -> Result<Arc<dyn MediaStream>, CameraError> {
            if let Some(e) = &self.fail {
                return Err(e.clone());
            }
            self.opens.lock().unwrap().push(mode);
            let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            Ok(Arc::new(FakeStream {
                tracks: AtomicUsize::new(1),
                live: Arc::clone(&self.live),
            }))
        }
    }

    /// Replays scripted detections, then reports nothing.
    #[derive(Default)]
    struct FakeDetector {
        script: Mutex<VecDeque<Result<Vec<DetectedBarcode>, CoreError>>>,
        calls: AtomicUsize,
    }

    impl FakeDetector {
        fn with(script: Vec<Result<Vec<DetectedBarcode>, CoreError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn codes(codes: &[&str]) -> Result<Vec<DetectedBarcode>, CoreError> {
            Ok(codes.iter().map(|c| DetectedBarcode::new(*c)).collect())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BarcodeDetector for FakeDetector {
        async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedBarcode>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct FakeLookup {
        items: HashMap<String, InventoryItem>,
        fail: bool,
        hold: Option<Arc<Notify>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ItemLookup for FakeLookup {
        async fn find_by_barcode(&self, code: &str) -> Result<Option<InventoryItem>, CoreError> {
            self.queries.lock().unwrap().push(code.to_owned());
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            if self.fail {
                return Err(CoreError::Api {
                    message: "unavailable".into(),
                    code: Some("UNAVAILABLE".into()),
                    status: Some(503),
                });
            }
            Ok(self.items.get(code).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<Notification>>);

    impl RecordingNotifier {
        fn titles(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|n| n.title.clone()).collect()
        }

        fn last(&self) -> Option<Notification> {
            self.0.lock().unwrap().last().cloned()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    fn resistor() -> InventoryItem {
        InventoryItem {
            id: EntityId::new("INV42"),
            name: "10k Resistor".into(),
            item_type: "Resistor".into(),
            value: "10k".into(),
            quantity: Some(100),
            unit: Some("pcs".into()),
            part_number: None,
            description: None,
            barcode: Some("0123456789012".into()),
            image_url: None,
            vendor_id: None,
            rate: None,
            created_at: None,
        }
    }

    struct Harness {
        scan: ScanLoop,
        camera: Arc<FakeCamera>,
        detector: Arc<FakeDetector>,
        lookup: Arc<FakeLookup>,
        notes: Arc<RecordingNotifier>,
    }

    fn harness(camera: FakeCamera, detector: Arc<FakeDetector>, lookup: FakeLookup) -> Harness {
        let camera = Arc::new(camera);
        let lookup = Arc::new(lookup);
        let notes = Arc::new(RecordingNotifier::default());
        let scan = ScanLoop::new(
            camera.clone(),
            Some(detector.clone() as Arc<dyn BarcodeDetector>),
            lookup.clone(),
            notes.clone(),
        );
        Harness {
            scan,
            camera,
            detector,
            lookup,
            notes,
        }
    }

    fn with_item() -> FakeLookup {
        let mut lookup = FakeLookup::default();
        lookup.items.insert("0123456789012".into(), resistor());
        lookup
    }

    async fn wait_phase(scan: &ScanLoop, pred: impl FnMut(&ScanSession) -> bool) -> ScanSession {
        let mut rx = scan.observe();
        tokio::time::timeout(Duration::from_secs(10), rx.wait_for(pred))
            .await
            .expect("scan phase never reached")
            .unwrap()
            .clone()
    }

    // ── Capability and camera failures ───────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn missing_detector_warns_once_and_stays_idle() {
        let camera = Arc::new(FakeCamera::default());
        let notes = Arc::new(RecordingNotifier::default());
        let scan = ScanLoop::new(camera.clone(), None, Arc::new(FakeLookup::default()), notes.clone());

        for _ in 0..3 {
            let err = scan.start().await.unwrap_err();
            assert!(matches!(err, CoreError::CapabilityMissing { .. }));
        }

        assert_eq!(scan.phase(), ScanPhase::Idle);
        assert!(camera.opens().is_empty());
        assert_eq!(notes.titles(), vec!["Unsupported Browser"]);
        assert_eq!(
            notes.last().unwrap().message,
            "Barcode detection is not supported in your browser."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn denied_camera_notifies_and_stays_idle() {
        let h = harness(
            FakeCamera::failing(CameraError::PermissionDenied),
            FakeDetector::with(vec![]),
            FakeLookup::default(),
        );

        let err = h.scan.start().await.unwrap_err();
        assert!(matches!(err, CoreError::CameraUnavailable { .. }));
        assert_eq!(h.scan.phase(), ScanPhase::Idle);
        assert_eq!(h.notes.titles(), vec!["Camera Access Denied"]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.detector.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_camera_reports_browser_message() {
        let h = harness(
            FakeCamera::failing(CameraError::Unsupported),
            FakeDetector::with(vec![]),
            FakeLookup::default(),
        );

        assert!(h.scan.start().await.is_err());
        let note = h.notes.last().unwrap();
        assert_eq!(note.title, "Unsupported Browser");
        assert_eq!(note.message, "Your browser does not support camera access.");
    }

    // ── Detection and resolution ─────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn match_pauses_polling_until_dismissed() {
        let h = harness(
            FakeCamera::default(),
            FakeDetector::with(vec![FakeDetector::codes(&[]), FakeDetector::codes(&["0123456789012"])]),
            with_item(),
        );

        h.scan.start().await.unwrap();
        assert_eq!(h.scan.phase(), ScanPhase::Scanning);

        let session = wait_phase(&h.scan, |s| s.matched().is_some()).await;
        let item = session.matched().unwrap();
        assert_eq!(item.id.as_str(), "INV42");
        assert_eq!(item.name, "10k Resistor");
        assert_eq!(session.last_detected.as_deref(), Some("0123456789012"));

        let calls = h.detector.calls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.detector.calls(), calls, "detector polled while a match is shown");

        assert!(h.scan.dismiss());
        assert_eq!(h.scan.phase(), ScanPhase::Scanning);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(h.detector.calls() > calls);
        assert_eq!(h.camera.opens(), vec![CameraMode::Scan]);
    }

    #[tokio::test(start_paused = true)]
    async fn two_codes_in_one_tick_resolve_only_the_first() {
        let h = harness(
            FakeCamera::default(),
            FakeDetector::with(vec![FakeDetector::codes(&["0123456789012", "5555"])]),
            with_item(),
        );

        h.scan.start().await.unwrap();
        wait_phase(&h.scan, |s| s.matched().is_some()).await;

        assert_eq!(h.lookup.queries(), vec!["0123456789012"]);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_resumes_scanning_on_same_stream() {
        let h = harness(
            FakeCamera::default(),
            FakeDetector::with(vec![FakeDetector::codes(&["999"])]),
            FakeLookup::default(),
        );

        h.scan.start().await.unwrap();
        let session = wait_phase(&h.scan, |s| s.is_scanning() && s.last_detected.is_some()).await;

        assert_eq!(session.last_detected.as_deref(), Some("999"));
        let note = h.notes.last().unwrap();
        assert_eq!(note.title, "Not Found");
        assert_eq!(note.message, "No inventory item found with barcode: 999");
        assert_eq!(h.camera.opens().len(), 1, "camera re-acquired");
        assert_eq!(h.scan.active_tracks(), 1);

        let calls = h.detector.calls();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(h.detector.calls() > calls, "polling did not resume");
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_error_notifies_and_resumes() {
        let lookup = FakeLookup {
            fail: true,
            ..FakeLookup::default()
        };
        let h = harness(
            FakeCamera::default(),
            FakeDetector::with(vec![FakeDetector::codes(&["0123456789012"])]),
            lookup,
        );

        h.scan.start().await.unwrap();
        wait_phase(&h.scan, |s| s.is_scanning() && s.last_detected.is_some()).await;

        let note = h.notes.last().unwrap();
        assert_eq!(note.title, "Error");
        assert_eq!(note.message, "Could not fetch item details.");
        assert_eq!(h.scan.active_tracks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn detector_failure_releases_camera() {
        let h = harness(
            FakeCamera::default(),
            FakeDetector::with(vec![Err(CoreError::Internal("decoder crashed".into()))]),
            FakeLookup::default(),
        );

        h.scan.start().await.unwrap();
        wait_phase(&h.scan, |s| s.phase == ScanPhase::Idle).await;

        assert_eq!(h.scan.active_tracks(), 0);
        assert_eq!(h.camera.live.load(Ordering::SeqCst), 0);
        assert_eq!(h.notes.titles(), vec!["Error"]);

        // User may retry.
        h.scan.start().await.unwrap();
        assert_eq!(h.scan.phase(), ScanPhase::Scanning);
        assert_eq!(h.camera.opens().len(), 2);
    }

    // ── Teardown ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn stop_releases_tracks_in_every_phase() {
        // Idle
        let h = harness(FakeCamera::default(), FakeDetector::with(vec![]), FakeLookup::default());
        h.scan.stop();
        assert_eq!(h.camera.live.load(Ordering::SeqCst), 0);

        // Scanning
        h.scan.start().await.unwrap();
        assert_eq!(h.scan.active_tracks(), 1);
        h.scan.shutdown().await;
        assert_eq!(h.scan.phase(), ScanPhase::Idle);
        assert_eq!(h.camera.live.load(Ordering::SeqCst), 0);

        // Resolving, with the lookup stuck
        let hold = Arc::new(Notify::new());
        let lookup = FakeLookup {
            hold: Some(hold.clone()),
            ..with_item()
        };
        let h = harness(
            FakeCamera::default(),
            FakeDetector::with(vec![FakeDetector::codes(&["0123456789012"])]),
            lookup,
        );
        h.scan.start().await.unwrap();
        wait_phase(&h.scan, |s| matches!(s.phase, ScanPhase::Resolving { .. })).await;
        h.scan.shutdown().await;

        assert_eq!(h.scan.phase(), ScanPhase::Idle);
        assert_eq!(h.camera.live.load(Ordering::SeqCst), 0);

        // A late lookup result must not resurrect the session.
        hold.notify_waiters();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.scan.phase(), ScanPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_camera() {
        let camera = Arc::new(FakeCamera::default());
        {
            let scan = ScanLoop::new(
                camera.clone(),
                Some(FakeDetector::with(vec![]) as Arc<dyn BarcodeDetector>),
                Arc::new(FakeLookup::default()),
                Arc::new(RecordingNotifier::default()),
            );
            scan.start().await.unwrap();
            assert_eq!(camera.live.load(Ordering::SeqCst), 1);
        }
        assert_eq!(camera.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_releases_scan_stream_first() {
        let h = harness(FakeCamera::default(), FakeDetector::with(vec![]), FakeLookup::default());

        h.scan.start().await.unwrap();
        let frame = h.scan.capture_still().await.unwrap();

        assert_eq!(frame.width, 640);
        assert_eq!(h.camera.opens(), vec![CameraMode::Scan, CameraMode::Capture]);
        assert_eq!(h.camera.peak.load(Ordering::SeqCst), 1, "two streams held at once");
        assert_eq!(h.camera.live.load(Ordering::SeqCst), 0);
        assert_eq!(h.scan.phase(), ScanPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_interval_sets_poll_rate() {
        let detector = FakeDetector::with(vec![]);
        let scan = ScanLoop::new(
            Arc::new(FakeCamera::default()),
            Some(detector.clone() as Arc<dyn BarcodeDetector>),
            Arc::new(FakeLookup::default()),
            Arc::new(RecordingNotifier::default()),
        )
        .with_interval(Duration::from_secs(2));

        scan.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(4_100)).await;
        assert_eq!(detector.calls(), 2);
        scan.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn interval_override_applies_after_a_scan_has_run() {
        let detector = FakeDetector::with(vec![]);
        let scan = ScanLoop::new(
            Arc::new(FakeCamera::default()),
            Some(detector.clone() as Arc<dyn BarcodeDetector>),
            Arc::new(FakeLookup::default()),
            Arc::new(RecordingNotifier::default()),
        );
        scan.start().await.unwrap();
        scan.shutdown().await;

        let scan = scan.with_interval(Duration::from_secs(2));
        assert_eq!(scan.interval(), Duration::from_secs(2));

        let before = detector.calls();
        scan.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(4_100)).await;
        assert_eq!(detector.calls() - before, 2);
        scan.shutdown().await;
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(millis(Duration::ZERO), 1);
        assert_eq!(millis(Duration::from_millis(750)), 750);
    }
}
