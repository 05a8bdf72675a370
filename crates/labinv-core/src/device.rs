// ── Device classification ──
//
// Buckets the viewport into Mobile or Desktop by a width breakpoint.
// The class starts Unknown and stays Unknown until the first
// measurement; after that it only ever flips between Mobile and Desktop.

use tokio::sync::watch;
use tracing::debug;

/// Viewport width (px) below which a device counts as mobile.
pub const DEFAULT_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceClass {
    /// No measurement yet.
    #[default]
    Unknown,
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Classify one width against a breakpoint.
    pub fn from_width(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// `"Mobile"` / `"Desktop"`; `None` while unknown.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Mobile => Some("Mobile"),
            Self::Desktop => Some("Desktop"),
        }
    }
}

/// Observable device class fed by viewport measurements.
///
/// Call [`measure`](Self::measure) on the first layout and on every
/// resize; subscribers see only actual changes.
#[derive(Debug)]
pub struct DeviceClassifier {
    breakpoint: u32,
    tx: watch::Sender<DeviceClass>,
}

impl Default for DeviceClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINT)
    }
}

impl DeviceClassifier {
    pub fn new(breakpoint: u32) -> Self {
        let (tx, _) = watch::channel(DeviceClass::Unknown);
        Self { breakpoint, tx }
    }

    pub fn breakpoint(&self) -> u32 {
        self.breakpoint
    }

    /// Record a viewport width. Returns the resulting class.
    pub fn measure(&self, width: u32) -> DeviceClass {
        let class = DeviceClass::from_width(width, self.breakpoint);
        let changed = self.tx.send_if_modified(|current| {
            if *current == class {
                false
            } else {
                *current = class;
                true
            }
        });
        if changed {
            debug!(width, breakpoint = self.breakpoint, ?class, "device class changed");
        }
        class
    }

    pub fn current(&self) -> DeviceClass {
        *self.tx.borrow()
    }

    /// Subscribe to class changes. The receiver starts at the current class.
    pub fn observe(&self) -> watch::Receiver<DeviceClass> {
        self.tx.subscribe()
    }
}
