//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use labinv_config::ConfigError;
use labinv_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {service}")]
    #[diagnostic(
        code(labinv::connection_failed),
        help(
            "Check your network connection and the endpoint overrides in your profile.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { service: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(labinv::auth_failed),
        help(
            "Verify your email and password.\n\
             Run: labinv auth login --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No {secret} configured for profile '{profile}'")]
    #[diagnostic(
        code(labinv::no_credentials),
        help(
            "Configure credentials with: labinv config init\n\
             Or store one with: labinv config set-password --profile {profile}"
        )
    )]
    NoCredentials { profile: String, secret: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(labinv::not_found),
        help("Run: labinv {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(labinv::api_error))]
    ApiError { code: String, message: String },

    #[error("{feature} is unavailable")]
    #[diagnostic(code(labinv::unavailable), help("{hint}"))]
    Unavailable { feature: String, hint: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(labinv::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(labinv::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: labinv config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(labinv::no_config),
        help(
            "Create one with: labinv config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(labinv::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(labinv::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(labinv::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(labinv::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn not_found(resource_type: &str, identifier: &str, list_command: &str) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { service, reason } => {
                CliError::ConnectionFailed { service, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::NotSignedIn => CliError::AuthFailed {
                profile: "current".into(),
                message: "not signed in".into(),
            },

            CoreError::Disconnected => CliError::ConnectionFailed {
                service: "lab session".into(),
                reason: "the session was closed".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => {
                let list_command = list_command_for(&entity_type);
                CliError::NotFound {
                    resource_type: entity_type,
                    identifier,
                    list_command,
                }
            }

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::CapabilityMissing { capability } => CliError::Unavailable {
                feature: capability,
                hint: "This device cannot provide the feature.".into(),
            },

            CoreError::CameraUnavailable { reason } => CliError::Unavailable {
                feature: "Camera".into(),
                hint: reason,
            },

            CoreError::Unsupported { operation } => CliError::Unavailable {
                feature: operation,
                hint: "Not supported by this build.".into(),
            },

            CoreError::Api { message, code, .. } => CliError::ApiError {
                code: code.unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Unavailable {
                feature: "Feature".into(),
                hint: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

fn list_command_for(entity_type: &str) -> String {
    match entity_type.to_ascii_lowercase().as_str() {
        "vendor" => "vendors list".into(),
        "item type" | "type" => "types list".into(),
        "profile" => "profile show".into(),
        _ => "items list".into(),
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile, secret } => {
                CliError::NoCredentials { profile, secret }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}
