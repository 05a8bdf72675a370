// ── Lab facade ──
//
// Owns the service clients and the signed-in session. Handles sign-in,
// token refresh, background refresh, command routing, and implements the
// profile, lookup and text-generation seams on top of the clients.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use labinv_api::identity::{DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL};
use labinv_api::{
    AuthSession, DescriptionRequest, DocumentClient, GenerativeClient, IdentityClient,
    ImageHostClient, TokenSlot, TransportConfig,
};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{AuthCredentials, LabConfig};
use crate::dashboard::DashboardSummary;
use crate::device::DeviceClassifier;
use crate::error::CoreError;
use crate::gate::RouteWatcher;
use crate::model::item_type::{type_fields, validate_type_name};
use crate::model::profile::signup_fields;
use crate::model::vendor::stamp_edit;
use crate::model::{
    EntityId, InventoryItem, ItemType, Profile, UpdatedBy, Vendor, collections,
};
use crate::notify::Notifier;
use crate::scan::{BarcodeDetector, Camera, ScanLoop};
use crate::services::{DescriptionInput, ItemLookup, TextGenerator};
use crate::session::{
    AuthUser, BoxStream, IdentityHub, ProfileEvent, ProfileSource, SessionResolver,
    SessionState,
};
use crate::store::DataStore;
use crate::write::{PendingWrite, WriteFailure};

const COMMAND_CHANNEL_SIZE: usize = 64;
const FAILURE_CHANNEL_SIZE: usize = 32;

// ── Lab ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<LabInner>`. Construction builds the clients
/// but does not sign in; call [`sign_in`](Self::sign_in) or
/// [`sign_up`](Self::sign_up) before reading or writing data.
#[derive(Clone)]
pub struct Lab {
    inner: Arc<LabInner>,
}

struct LabInner {
    config: LabConfig,
    store: Arc<DataStore>,
    identity: IdentityClient,
    documents: DocumentClient,
    generative: Option<GenerativeClient>,
    images: Option<ImageHostClient>,
    token: TokenSlot,
    session: Mutex<Option<AuthSession>>,
    hub: IdentityHub,
    device: Arc<DeviceClassifier>,
    failures: broadcast::Sender<WriteFailure>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current session; replaced on every sign-in.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Lab {
    /// Build the service clients. AI and image upload stay disabled
    /// when their keys are absent.
    pub fn new(config: LabConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let endpoints = &config.endpoints;

        let identity = match (&endpoints.identity, &endpoints.token) {
            (None, None) => IdentityClient::new(config.api_key.clone(), &transport)?,
            (identity_url, token_url) => IdentityClient::with_endpoints(
                identity_url.as_deref().unwrap_or(DEFAULT_IDENTITY_URL),
                token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL),
                config.api_key.clone(),
                &transport,
            )?,
        };

        let token = TokenSlot::new();
        let documents = match &endpoints.documents {
            Some(root) => {
                DocumentClient::with_endpoint(root, &config.project_id, token.clone(), &transport)?
            }
            None => DocumentClient::new(&config.project_id, token.clone(), &transport)?,
        };

        let generative = match config
            .ai_api_key
            .as_ref()
            .filter(|k| !k.expose_secret().is_empty())
        {
            Some(key) => Some(match &endpoints.generative {
                Some(url) => {
                    GenerativeClient::with_endpoint(url, key, config.ai_model.as_deref(), &transport)?
                }
                None => GenerativeClient::new(key, config.ai_model.as_deref(), &transport)?,
            }),
            None => None,
        };

        let images = match config
            .image_api_key
            .clone()
            .filter(|k| !k.expose_secret().is_empty())
        {
            Some(key) => Some(match &endpoints.image {
                Some(url) => ImageHostClient::with_endpoint(url, key, &transport)?,
                None => ImageHostClient::new(key, &transport)?,
            }),
            None => None,
        };

        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let device = Arc::new(DeviceClassifier::new(config.breakpoint));

        Ok(Self {
            inner: Arc::new(LabInner {
                config,
                store: Arc::new(DataStore::new()),
                identity,
                documents,
                generative,
                images,
                token,
                session: Mutex::new(None),
                hub: IdentityHub::new(),
                device,
                failures,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &LabConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Viewport classifier feeding the route gate.
    pub fn device(&self) -> &Arc<DeviceClassifier> {
        &self.inner.device
    }

    pub fn ai_enabled(&self) -> bool {
        self.inner.generative.is_some()
    }

    pub fn image_upload_enabled(&self) -> bool {
        self.inner.images.is_some()
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Sign in with email and password and start background tasks.
    pub async fn sign_in(&self, credentials: AuthCredentials) -> Result<AuthUser, CoreError> {
        let creds = labinv_api::Credentials::from(credentials);
        let session = match self.inner.identity.sign_in(&creds).await {
            Ok(s) => s,
            Err(e) => return Err(self.reject_identity(e.into())),
        };
        info!(uid = %session.uid, "signed in");
        let user = self.establish(session).await;
        self.inner.hub.publish(Some(user.clone()));
        Ok(user)
    }

    /// Create an account, write its initial profile document, and sign in.
    pub async fn sign_up(&self, credentials: AuthCredentials) -> Result<AuthUser, CoreError> {
        let creds = labinv_api::Credentials::from(credentials);
        let session = match self.inner.identity.sign_up(&creds).await {
            Ok(s) => s,
            Err(e) => return Err(self.reject_identity(e.into())),
        };
        info!(uid = %session.uid, "account created");
        let user = self.establish(session).await;

        let fields = signup_fields(&user.uid, user.email.as_deref(), &now_iso());
        self.inner
            .documents
            .set(collections::USERS, &user.uid, &fields)
            .await?;

        self.inner.hub.publish(Some(user.clone()));
        Ok(user)
    }

    /// Stop background tasks, forget the session and cached data.
    pub async fn sign_out(&self) {
        self.disconnect().await;
        self.inner.token.clear();
        *self.inner.session.lock().await = None;
        self.inner.store.clear();
        self.inner.hub.publish(None);
        info!("signed out");
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.inner.session.lock().await.as_ref().map(auth_user)
    }

    /// Publish an identity failure and hand the error back.
    fn reject_identity(&self, error: CoreError) -> CoreError {
        warn!(error = %error, "identity request failed");
        self.inner.hub.publish_error(CoreError::AuthenticationFailed {
            message: error.to_string(),
        });
        error
    }

    /// Install the token and spawn the session's background tasks.
    async fn establish(&self, session: AuthSession) -> AuthUser {
        // A previous session's tasks must not outlive it.
        self.disconnect().await;

        let user = auth_user(&session);
        self.inner.token.set(session.id_token.clone());
        *self.inner.session.lock().await = Some(session);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let mut handles = self.inner.task_handles.lock().await;
        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            handles.push(tokio::spawn(command_processor_task(self.clone(), rx, child.clone())));
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            handles.push(tokio::spawn(refresh_task(self.clone(), interval_secs, child)));
        }

        user
    }

    /// Cancel the current session's background tasks and wait for them.
    pub async fn disconnect(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        // Fresh channel so the next session can spawn a new processor.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }
        debug!("session tasks stopped");
    }

    /// Ensure the bearer token is valid, refreshing it when close to expiry.
    async fn authorized(&self) -> Result<String, CoreError> {
        let mut guard = self.inner.session.lock().await;
        let session = guard.as_mut().ok_or(CoreError::NotSignedIn)?;
        if session.is_expired(Utc::now()) {
            debug!(uid = %session.uid, "refreshing id token");
            let refreshed = match self.inner.identity.refresh(session).await {
                Ok(s) => s,
                Err(e) => {
                    let error = CoreError::from(e);
                    if error.is_auth() {
                        self.inner.hub.publish_error(CoreError::AuthenticationFailed {
                            message: error.to_string(),
                        });
                    }
                    return Err(error);
                }
            };
            self.inner.token.set(refreshed.id_token.clone());
            *session = refreshed;
        }
        Ok(session.uid.clone())
    }

    // ── Data refresh ─────────────────────────────────────────────

    /// Re-list items, vendors and item types into the DataStore.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        self.authorized().await?;
        let docs = &self.inner.documents;

        let (items, vendors, types) = tokio::join!(
            docs.list(collections::INVENTORY, Some("name")),
            docs.list(collections::VENDORS, Some("name")),
            docs.list(collections::ITEM_TYPES, Some("name")),
        );

        let items = decode_all::<InventoryItem>(items?);
        let vendors = decode_all::<Vendor>(vendors?);
        let types = decode_all::<ItemType>(types?);

        self.inner.store.apply_full_refresh(items, vendors, types);
        debug!(
            items = self.inner.store.item_count(),
            vendors = self.inner.store.vendor_count(),
            "data refresh complete"
        );
        Ok(())
    }

    /// Read one item straight from the document store.
    pub async fn fetch_item(&self, id: &EntityId) -> Result<InventoryItem, CoreError> {
        self.authorized().await?;
        let doc = self
            .inner
            .documents
            .get(collections::INVENTORY, id.as_str())
            .await?
            .ok_or_else(|| CoreError::not_found("Item", id.as_str()))?;
        let item: InventoryItem = doc.decode()?;
        self.inner.store.put_item(item.clone());
        Ok(item)
    }

    /// Read a profile document; `None` when it does not exist.
    pub async fn fetch_profile(&self, uid: &str) -> Result<Option<Profile>, CoreError> {
        self.authorized().await?;
        let Some(doc) = self.inner.documents.get(collections::USERS, uid).await? else {
            return Ok(None);
        };
        let mut profile: Profile = doc.decode()?;
        if profile.uid.is_empty() {
            profile.uid = doc.id;
        }
        Ok(Some(profile))
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write and wait for its result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if self.inner.session.lock().await.is_none() {
            return Err(CoreError::NotSignedIn);
        }
        cmd.validate()?;

        let (tx, rx) = oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    /// Submit a write without waiting. Failures are also published on
    /// [`write_failures`](Self::write_failures).
    pub fn submit(&self, cmd: Command) -> PendingWrite {
        let (tx, rx) = oneshot::channel();
        let lab = self.clone();
        tokio::spawn(async move {
            let action = cmd.label();
            let result = lab.execute(cmd).await.map_err(Arc::new);
            if let Err(error) = &result {
                warn!(action, error = %error, "write failed");
                let _ = lab.inner.failures.send(WriteFailure {
                    action,
                    error: Arc::clone(error),
                });
            }
            let _ = tx.send(result);
        });
        PendingWrite::new(rx)
    }

    pub fn write_failures(&self) -> broadcast::Receiver<WriteFailure> {
        self.inner.failures.subscribe()
    }

    // ── Image upload ─────────────────────────────────────────────

    /// Upload an image and return its public URL.
    pub async fn upload_image(&self, image: &[u8]) -> Result<String, CoreError> {
        let images = self.inner.images.as_ref().ok_or_else(|| CoreError::Config {
            message: "Image upload is disabled: no image host API key configured.".into(),
        })?;
        Ok(images.upload(image).await?)
    }

    // ── Session wiring ───────────────────────────────────────────

    /// Auth-state source fed by this lab's sign-in, sign-up and sign-out.
    pub fn identity(&self) -> IdentityHub {
        self.inner.hub.clone()
    }

    /// Start a session resolver over this lab's identity and profiles.
    pub fn session_resolver(&self) -> SessionResolver {
        SessionResolver::spawn(Arc::new(self.identity()), Arc::new(self.clone()))
    }

    /// Start a route watcher over a session, this lab's device classifier,
    /// and a path source.
    pub fn route_watcher(
        &self,
        session: watch::Receiver<SessionState>,
        path: watch::Receiver<String>,
    ) -> RouteWatcher {
        RouteWatcher::spawn(
            self.inner.config.routes.clone(),
            session,
            self.inner.device.observe(),
            path,
        )
    }

    /// Build a scan loop that resolves codes against this lab.
    pub fn scan_loop(
        &self,
        camera: Arc<dyn Camera>,
        detector: Option<Arc<dyn BarcodeDetector>>,
        notifier: Arc<dyn Notifier>,
    ) -> ScanLoop {
        ScanLoop::new(camera, detector, Arc::new(self.clone()), notifier)
            .with_interval(self.inner.config.scan_interval)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: sign in, refresh, run closure, sign out.
    ///
    /// Periodic refresh is disabled; a CLI invocation needs one snapshot.
    pub async fn oneshot<F, Fut, T>(
        mut config: LabConfig,
        credentials: AuthCredentials,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Lab) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        config.refresh_interval_secs = 0;

        let lab = Lab::new(config)?;
        lab.sign_in(credentials).await?;
        let result = match lab.full_refresh().await {
            Ok(()) => f(lab.clone()).await,
            Err(e) => Err(e),
        };
        lab.sign_out().await;
        result
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn items_snapshot(&self) -> Arc<Vec<Arc<InventoryItem>>> {
        self.inner.store.items_snapshot()
    }

    pub fn vendors_snapshot(&self) -> Arc<Vec<Arc<Vendor>>> {
        self.inner.store.vendors_snapshot()
    }

    pub fn item_types_snapshot(&self) -> Arc<Vec<Arc<ItemType>>> {
        self.inner.store.item_types_snapshot()
    }

    /// Overview figures over the current snapshots.
    pub fn dashboard(&self) -> DashboardSummary {
        self.inner.store.dashboard()
    }
}

impl Drop for LabInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Collaborator implementations ─────────────────────────────────

impl ProfileSource for Lab {
    /// Emulates a live subscription by re-reading `users/{uid}`. The
    /// first snapshot is read immediately; later reads are only
    /// emitted when the document changed. Ends after the first error.
    fn watch_profile(&self, uid: &str) -> BoxStream<ProfileEvent> {
        let lab = self.clone();
        let uid = uid.to_owned();
        let period = self.inner.config.profile_poll_interval;

        Box::pin(async_stream::stream! {
            let mut last: Option<Option<Profile>> = None;
            let mut ticker = (!period.is_zero()).then(|| tokio::time::interval(period));
            loop {
                if let Some(t) = ticker.as_mut() {
                    t.tick().await;
                }
                match lab.fetch_profile(&uid).await {
                    Ok(profile) => {
                        if last.as_ref() != Some(&profile) {
                            last = Some(profile.clone());
                            yield Ok(profile);
                        }
                    }
                    Err(e) => {
                        yield Err(Arc::new(e));
                        break;
                    }
                }
                if ticker.is_none() {
                    break;
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl ItemLookup for Lab {
    async fn find_by_barcode(&self, code: &str) -> Result<Option<InventoryItem>, CoreError> {
        self.authorized().await?;
        let docs = self
            .inner
            .documents
            .query_equal(collections::INVENTORY, "barcode", &Value::String(code.to_owned()), 1)
            .await?;
        let Some(doc) = docs.into_iter().next() else {
            return Ok(None);
        };
        let item: InventoryItem = doc.decode()?;
        self.inner.store.put_item(item.clone());
        Ok(Some(item))
    }
}

#[async_trait::async_trait]
impl TextGenerator for Lab {
    async fn summarize(&self, paper_text: &str) -> Result<String, CoreError> {
        let summary = self.generator()?.summarize(paper_text).await?;
        Ok(summary.summary)
    }

    async fn enhance_description(&self, input: &DescriptionInput) -> Result<String, CoreError> {
        let req = DescriptionRequest {
            name: input.name.clone(),
            item_type: input.item_type.clone(),
            value: input.value.clone(),
            part_number: input.part_number.clone().unwrap_or_default(),
        };
        let enhanced = self.generator()?.enhance_description(&req).await?;
        Ok(enhanced.description)
    }
}

impl Lab {
    fn generator(&self) -> Result<&GenerativeClient, CoreError> {
        self.inner.generative.as_ref().ok_or_else(|| CoreError::Config {
            message: "AI features are disabled: no AI API key configured.".into(),
        })
    }

    /// Who is editing, for `updatedBy` stamps.
    async fn editor(&self, uid: &str) -> Result<UpdatedBy, CoreError> {
        let profile = self.fetch_profile(uid).await?;
        let email = self.current_user().await.and_then(|u| u.email);
        Ok(UpdatedBy {
            uid: uid.to_owned(),
            display_name: Some(
                profile
                    .as_ref()
                    .map(Profile::display)
                    .or(email)
                    .unwrap_or_else(|| uid.to_owned()),
            ),
            post: profile.and_then(|p| p.post),
            device: None,
        })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically re-list all collections.
async fn refresh_task(lab: Lab, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = lab.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands one at a time, in submission order.
async fn command_processor_task(
    lab: Lab,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let label = envelope.command.label();
                let result = route_command(&lab, envelope.command).await;
                match &result {
                    Ok(_) => debug!(command = label, "command applied"),
                    Err(e) => debug!(command = label, error = %e, "command failed"),
                }
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(lab: &Lab, cmd: Command) -> Result<CommandResult, CoreError> {
    let uid = lab.authorized().await?;
    let docs = &lab.inner.documents;
    let store = &lab.inner.store;

    match cmd {
        // ── Inventory ────────────────────────────────────────────
        Command::CreateItem(new_item) => {
            let barcode = EntityId::generate().to_string();
            let fields = new_item.into_fields(barcode, now_iso());
            let doc = docs.create(collections::INVENTORY, None, &fields).await?;
            let item: InventoryItem = doc.decode()?;
            info!(id = %item.id, barcode = ?item.barcode, "item created");
            store.put_item(item.clone());
            Ok(CommandResult::Item(item))
        }

        Command::UpdateItem { id, update } => {
            if update.is_empty() {
                return Err(CoreError::validation("Nothing to update"));
            }
            let fields = update.into_fields();
            let doc = docs
                .update(collections::INVENTORY, id.as_str(), &fields)
                .await
                .map_err(|e| not_found_as(e, "Item", &id))?;
            let item: InventoryItem = doc.decode()?;
            store.put_item(item.clone());
            Ok(CommandResult::Item(item))
        }

        Command::DeleteItem { id } => {
            docs.delete(collections::INVENTORY, id.as_str()).await?;
            store.drop_item(&id);
            Ok(CommandResult::Ok)
        }

        // ── Vendors ──────────────────────────────────────────────
        Command::CreateVendor(draft) => {
            let editor = lab.editor(&uid).await?;
            let mut fields = draft.into_fields();
            stamp_edit(&mut fields, &editor, lab.inner.device.current(), now_iso());
            let doc = docs.create(collections::VENDORS, None, &fields).await?;
            let vendor: Vendor = doc.decode()?;
            store.put_vendor(vendor.clone());
            Ok(CommandResult::Vendor(vendor))
        }

        Command::UpdateVendor { id, draft } => {
            let editor = lab.editor(&uid).await?;
            let mut fields = draft.into_fields();
            stamp_edit(&mut fields, &editor, lab.inner.device.current(), now_iso());
            let doc = docs
                .update(collections::VENDORS, id.as_str(), &fields)
                .await
                .map_err(|e| not_found_as(e, "Vendor", &id))?;
            let vendor: Vendor = doc.decode()?;
            store.put_vendor(vendor.clone());
            Ok(CommandResult::Vendor(vendor))
        }

        Command::DeleteVendor { id } => {
            docs.delete(collections::VENDORS, id.as_str()).await?;
            store.drop_vendor(&id);
            Ok(CommandResult::Ok)
        }

        // ── Taxonomy ─────────────────────────────────────────────
        Command::CreateItemType { name } => {
            validate_type_name(&name, &store.item_type_names())?;
            let fields = type_fields(&name);
            let doc = docs.create(collections::ITEM_TYPES, None, &fields).await?;
            let item_type: ItemType = doc.decode()?;
            store.put_item_type(item_type.clone());
            Ok(CommandResult::ItemType(item_type))
        }

        // ── Account ──────────────────────────────────────────────
        Command::UpdateProfile(update) => {
            let fields = update.into_fields(now_iso());
            let doc = match docs.update(collections::USERS, &uid, &fields).await {
                Ok(doc) => doc,
                Err(e) if e.is_not_found() => {
                    let mut full: Map<String, Value> = fields.clone();
                    full.insert("uid".into(), uid.clone().into());
                    docs.create(collections::USERS, Some(uid.as_str()), &full).await?
                }
                Err(e) => return Err(e.into()),
            };
            let mut profile: Profile = doc.decode()?;
            if profile.uid.is_empty() {
                profile.uid = uid;
            }
            Ok(CommandResult::Profile(profile))
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn auth_user(session: &AuthSession) -> AuthUser {
    AuthUser {
        uid: session.uid.clone(),
        email: session.email.clone(),
    }
}

/// Timestamps are stored as ISO-8601 strings.
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode documents, skipping (and logging) any that do not fit the model.
fn decode_all<T: serde::de::DeserializeOwned>(docs: Vec<labinv_api::Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(document = %doc.name, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

fn not_found_as(err: labinv_api::Error, entity: &str, id: &EntityId) -> CoreError {
    if err.is_not_found() {
        CoreError::not_found(entity, id.as_str())
    } else {
        err.into()
    }
}
