//! Clap derive structures for the `didly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so build.rs can render man pages from it.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// didly -- search, buy, and manage DID phone numbers
#[derive(Debug, Parser)]
#[command(
    name = "didly",
    version,
    about = "Search, buy, and manage DID phone numbers from the command line",
    long_about = "A CLI for a DID provisioning backend.\n\n\
        Search the inventory, purchase numbers, route their voice and SMS\n\
        traffic, and release them when you are done. Use --demo to try\n\
        everything against a seeded in-memory inventory.",
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

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "DIDLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, env = "DIDLY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// API token (overrides profile credentials)
    #[arg(long, env = "DIDLY_TOKEN", global = true, hide = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DIDLY_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "DIDLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DIDLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Use the seeded in-memory backend instead of a real one
    #[arg(long, env = "DIDLY_DEMO", global = true)]
    pub demo: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NumberTypeArg {
    Local,
    TollFree,
    Mobile,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search available numbers
    #[command(alias = "s")]
    Search(SearchArgs),

    /// Purchase an available number
    Buy(BuyArgs),

    /// Manage numbers you own
    #[command(alias = "n")]
    Numbers(NumbersArgs),

    /// Check backend health
    Health(HealthArgs),

    /// View customers
    Customers(CustomersArgs),

    /// List countries available for search
    Countries,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEARCH / BUY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// ISO country code (US, CA, GB, AU)
    #[arg(long, short = 'C')]
    pub country: Option<String>,

    /// Area code (digits only)
    #[arg(long, short = 'a')]
    pub area_code: Option<String>,

    /// City name (case-insensitive substring)
    #[arg(long)]
    pub city: Option<String>,

    /// Number pattern; '*' matches any run of characters
    #[arg(long)]
    pub pattern: Option<String>,

    /// Number type
    #[arg(long = "type", short = 't', value_enum)]
    pub number_type: Option<NumberTypeArg>,
}

#[derive(Debug, Args)]
pub struct BuyArgs {
    /// Listing id (from `didly search`)
    pub id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NUMBERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NumbersArgs {
    #[command(subcommand)]
    pub command: NumbersCommand,
}

#[derive(Debug, Subcommand)]
pub enum NumbersCommand {
    /// List owned numbers
    #[command(alias = "ls")]
    List {
        /// Free-text filter over number, name, and city
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Show one owned number
    Get {
        /// Number id
        id: String,
    },

    /// Change routing and naming of an owned number
    #[command(alias = "set")]
    Configure(ConfigureArgs),

    /// Release an owned number
    #[command(alias = "rm")]
    Release {
        /// Number id
        id: String,
    },
}

/// Every flag is optional; only the ones given are sent. An empty string
/// clears a text field.
#[derive(Debug, Args)]
pub struct ConfigureArgs {
    /// Number id
    pub id: String,

    /// Friendly name
    #[arg(long)]
    pub name: Option<String>,

    /// Enable or disable voice
    #[arg(long, value_name = "BOOL")]
    pub voice: Option<bool>,

    /// Enable or disable SMS
    #[arg(long, value_name = "BOOL")]
    pub sms: Option<bool>,

    /// Forward calls to a SIP URI (sip:user@host)
    #[arg(long, value_name = "URI")]
    pub sip_target: Option<String>,

    /// Forward calls to a webhook
    #[arg(long, value_name = "URL")]
    pub voice_webhook: Option<String>,

    /// Enable or disable voicemail
    #[arg(long, value_name = "BOOL")]
    pub voicemail: Option<bool>,

    /// Voicemail greeting text
    #[arg(long, value_name = "TEXT")]
    pub voicemail_greeting: Option<String>,

    /// Deliver inbound SMS to a webhook
    #[arg(long, value_name = "URL")]
    pub sms_webhook: Option<String>,

    /// Enable or disable the SMS auto-reply
    #[arg(long, value_name = "BOOL")]
    pub auto_reply: Option<bool>,

    /// SMS auto-reply text (max 160 characters)
    #[arg(long, value_name = "TEXT")]
    pub auto_reply_message: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HEALTH / CUSTOMERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Keep probing until interrupted
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Seconds between probes in watch mode
    #[arg(long, default_value = "5", requires = "watch")]
    pub interval: u64,
}

#[derive(Debug, Args)]
pub struct CustomersArgs {
    #[command(subcommand)]
    pub command: CustomersCommand,
}

#[derive(Debug, Subcommand)]
pub enum CustomersCommand {
    /// List customers
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
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

    /// Display current configuration (tokens redacted)
    Show,

    /// Store an API token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
