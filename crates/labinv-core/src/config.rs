// ── Runtime lab configuration ──
//
// These types describe *where* the hosted services live and how the
// session behaves. They carry credential data and tuning, but never
// touch disk. The CLI constructs a `LabConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

use crate::device::DEFAULT_BREAKPOINT;
use crate::gate::RouteGate;

/// Email/password sign-in material.
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub email: String,
    pub password: SecretString,
}

impl From<AuthCredentials> for labinv_api::Credentials {
    fn from(c: AuthCredentials) -> Self {
        Self {
            email: c.email,
            password: c.password,
        }
    }
}

/// Optional service endpoint overrides (emulators, tests).
///
/// `None` means the public endpoint for that service.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    pub identity: Option<String>,
    pub token: Option<String>,
    pub documents: Option<String>,
    pub generative: Option<String>,
    pub image: Option<String>,
}

/// Configuration for one lab workspace.
///
/// Built by the CLI, passed to `Lab`; core never reads config files.
#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Document store project id.
    pub project_id: String,
    /// Identity service web API key.
    pub api_key: SecretString,
    /// Generative model API key (AI features are disabled without it).
    pub ai_api_key: Option<SecretString>,
    /// Generative model name; `None` selects the default model.
    pub ai_model: Option<String>,
    /// Image host API key (image upload is disabled without it).
    pub image_api_key: Option<SecretString>,
    pub endpoints: Endpoints,
    /// Request timeout.
    pub timeout: Duration,
    /// Viewport width below which a device counts as mobile.
    pub breakpoint: u32,
    /// Scan loop detector polling period.
    pub scan_interval: Duration,
    /// How often the profile document is re-read while a session is live.
    pub profile_poll_interval: Duration,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Route table used by the gate.
    pub routes: RouteGate,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: SecretString::from(String::new()),
            ai_api_key: None,
            ai_model: None,
            image_api_key: None,
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(30),
            breakpoint: DEFAULT_BREAKPOINT,
            scan_interval: Duration::from_millis(500),
            profile_poll_interval: Duration::from_secs(15),
            refresh_interval_secs: 0,
            routes: RouteGate::default(),
        }
    }
}
