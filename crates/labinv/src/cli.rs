//! Clap derive structures for the `labinv` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// labinv -- lab electronics inventory from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "labinv",
    version,
    about = "Manage a lab electronics inventory from the command line",
    long_about = "Track inventory items, vendors and item types, look parts up by \
        barcode, and generate summaries and descriptions with a hosted model.\n\n\
        A USB barcode scanner works as a keyboard: run `labinv scan` and scan away.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Lab profile to use
    #[arg(long, short = 'p', env = "LABINV_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Document-store project id (overrides profile)
    #[arg(long, env = "LABINV_PROJECT", global = true)]
    pub project: Option<String>,

    /// Web API key (overrides profile)
    #[arg(long, env = "LABINV_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LABINV_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LABINV_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, create an account, or show the signed-in user
    Auth(AuthArgs),

    /// Manage inventory items
    #[command(alias = "item", alias = "i")]
    Items(ItemsArgs),

    /// Manage vendors
    #[command(alias = "vendor", alias = "v")]
    Vendors(VendorsArgs),

    /// Manage item types
    #[command(alias = "type")]
    Types(TypesArgs),

    /// Stock value, low-stock count, items per type and recent additions
    #[command(alias = "stats")]
    Dashboard,

    /// Show or update your profile
    Profile(ProfileArgs),

    /// AI-assisted summaries and descriptions
    Ai(AiArgs),

    /// Scan barcodes from a keyboard-wedge scanner on stdin
    Scan(ScanArgs),

    /// Show how a page path would be routed for a session and screen width
    Route(RouteArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Verify credentials and remember them for this profile
    Login {
        /// Account email (prompted when missing)
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Store the password in the system keyring
        #[arg(long)]
        save: bool,
    },

    /// Create a new account
    Signup {
        /// Account email (prompted when missing)
        #[arg(long, short = 'e')]
        email: Option<String>,
    },

    /// Forget the stored password for this profile
    Logout,

    /// Show the signed-in user and their profile
    Whoami,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ITEMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ItemsArgs {
    #[command(subcommand)]
    pub command: ItemsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// List inventory items
    #[command(alias = "ls")]
    List {
        /// Only items of this type (case-insensitive)
        #[arg(long, short = 't')]
        r#type: Option<String>,

        /// Case-insensitive substring match on name, value or part number
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show one item
    Get {
        /// Item id or barcode
        id: String,
    },

    /// Add an item (a barcode is generated)
    #[command(alias = "create")]
    Add {
        /// Item name
        name: String,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Update fields of an item
    Update {
        /// Item id or barcode
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ItemFields,

        /// Link a vendor by id
        #[arg(long)]
        vendor: Option<String>,

        /// Unit price
        #[arg(long)]
        rate: Option<f64>,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item id or barcode
        id: String,
    },

    /// Find an item by barcode
    Find {
        /// Barcode value
        #[arg(long, short = 'b')]
        barcode: String,
    },

    /// Upload a photo and attach it to an item
    Image {
        /// Item id or barcode
        id: String,

        /// Image file
        file: PathBuf,
    },
}

/// Item fields shared by add and update.
#[derive(Debug, Args)]
pub struct ItemFields {
    /// Item type (e.g. Resistor)
    #[arg(long = "type", short = 't')]
    pub item_type: Option<String>,

    /// Stock quantity
    #[arg(long)]
    pub quantity: Option<i64>,

    /// Unit of measure (default: pcs)
    #[arg(long)]
    pub unit: Option<String>,

    /// Value, e.g. 10k or 100nF
    #[arg(long)]
    pub value: Option<String>,

    /// Manufacturer part number
    #[arg(long)]
    pub part_number: Option<String>,

    /// Free-form description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VENDORS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VendorsArgs {
    #[command(subcommand)]
    pub command: VendorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum VendorsCommand {
    /// List vendors
    #[command(alias = "ls")]
    List,

    /// Show one vendor
    Get {
        /// Vendor id
        id: String,
    },

    /// Add a vendor
    #[command(alias = "create")]
    Add {
        /// Vendor name
        name: String,

        #[command(flatten)]
        fields: VendorFields,
    },

    /// Replace a vendor's details
    Update {
        /// Vendor id
        id: String,

        /// New name (defaults to the current one)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: VendorFields,
    },

    /// Delete a vendor
    #[command(alias = "rm")]
    Delete {
        /// Vendor id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct VendorFields {
    /// Online or offline store
    #[arg(long)]
    pub kind: Option<VendorKindArg>,

    /// Website URL
    #[arg(long)]
    pub website: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VendorKindArg {
    Online,
    Offline,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TYPES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub command: TypesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    /// List built-in and custom item types
    #[command(alias = "ls")]
    List,

    /// Add a custom item type
    Add {
        /// Type name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your profile
    Show,

    /// Update your profile (missing fields keep their current value)
    Update {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Position, e.g. "Lab Assistant"
        #[arg(long)]
        post: Option<String>,

        /// Mr, Ms, Mrs, Dr or Prof
        #[arg(long)]
        salutation: Option<String>,

        /// Male, Female or Other
        #[arg(long)]
        gender: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AiArgs {
    #[command(subcommand)]
    pub command: AiCommand,
}

#[derive(Debug, Subcommand)]
pub enum AiCommand {
    /// Summarize a paper (reads stdin when no file is given)
    Summarize {
        /// Text file containing the paper
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Generate a description for an item
    Enhance {
        /// Item id or barcode
        id: String,

        /// Write the description back to the item
        #[arg(long)]
        save: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCAN / ROUTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Stop after the first matched item
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Page path, e.g. /dashboard
    pub path: String,

    /// Viewport width in pixels (unmeasured when omitted)
    #[arg(long, short = 'w')]
    pub width: Option<u32>,

    /// Session state to evaluate against
    #[arg(long, default_value = "authenticated")]
    pub session: SessionArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SessionArg {
    Loading,
    Authenticated,
    Unauthenticated,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. project_id or documents_url
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a secret in the system keyring
    SetPassword {
        /// Which secret to store
        #[arg(long, default_value = "password")]
        secret: SecretArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretArg {
    Password,
    ApiKey,
    AiApiKey,
    ImageApiKey,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
