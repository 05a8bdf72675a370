//! Session routing, barcode scanning, and reactive inventory data between
//! `labinv-api` and UI consumers.
//!
//! - **[`Lab`]**: the facade. [`sign_in()`](Lab::sign_in) establishes a
//!   session and spawns the command processor (plus an optional periodic
//!   refresh). [`Lab::oneshot()`] wraps sign-in, a single refresh and
//!   sign-out for one CLI invocation.
//!
//! - **[`SessionResolver`]**: folds an identity stream and a per-user
//!   profile stream into one [`SessionState`]. Loading is reported until
//!   both the user and their profile have been resolved.
//!
//! - **[`DeviceClassifier`]** and **[`RouteGate`]**: classify the viewport
//!   as mobile or desktop and decide, per path, whether to show a loader,
//!   redirect, or render. [`RouteWatcher`] re-evaluates on every change.
//!
//! - **[`ScanLoop`]**: owns the camera while scanning, polls a
//!   [`BarcodeDetector`] on an interval, and resolves the first code to an
//!   inventory item. Camera and detector are traits so any platform can
//!   plug in.
//!
//! - **[`DataStore`]**: `DashMap` + `watch` backed snapshots of items,
//!   vendors and item types, summarised by [`DashboardSummary`].
//!
//! - **[`Command`]**: typed writes routed through an `mpsc` channel to the
//!   lab's command processor.

pub mod command;
pub mod config;
pub mod dashboard;
pub mod device;
pub mod error;
pub mod gate;
pub mod lab;
pub mod model;
pub mod notify;
pub mod scan;
pub mod services;
pub mod session;
pub mod store;
pub mod write;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{AuthCredentials, Endpoints, LabConfig};
pub use dashboard::{DashboardSummary, LOW_STOCK_THRESHOLD, TypeCount};
pub use device::{DEFAULT_BREAKPOINT, DeviceClass, DeviceClassifier};
pub use error::CoreError;
pub use gate::{RouteDecision, RouteGate, RouteWatcher};
pub use lab::Lab;
pub use notify::{ChannelNotifier, NotifyLevel, Notification, Notifier};
pub use scan::{
    BarcodeDetector, BarcodeFormat, Camera, CameraError, CameraMode, DetectedBarcode, Frame,
    MediaStream, ScanLoop, ScanPhase, ScanSession,
};
pub use services::{DescriptionInput, ItemLookup, TextGenerator};
pub use session::{
    AuthUser, IdentityHub, IdentityProvider, ProfileSource, SessionResolver, SessionState,
    SessionStatus,
};
pub use store::DataStore;
pub use write::{PendingWrite, WriteFailure};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    EntityId, Gender, InventoryItem, ItemType, ItemUpdate, NewItem, Profile, ProfileUpdate,
    Salutation, UpdatedBy, Vendor, VendorDraft, VendorKind,
};
