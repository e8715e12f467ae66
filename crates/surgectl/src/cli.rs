//! Clap derive structures for the `surgectl` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// surgectl -- watch and control Surge through its HTTP API
#[derive(Debug, Parser)]
#[command(
    name = "surgectl",
    version,
    about = "Watch and control Surge from the command line",
    long_about = "Reads and changes Surge state through the Surge HTTP API:\n\
        profiles, outbound mode, feature toggles, policy groups, and traffic.",
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
pub struct GlobalOpts {
    /// Configured instance to use
    #[arg(long, short = 'i', env = "SURGE_INSTANCE", global = true)]
    pub instance: Option<String>,

    /// Surge host (overrides instance)
    #[arg(long, env = "SURGE_HOST", global = true)]
    pub host: Option<String>,

    /// Surge HTTP API port (overrides instance)
    #[arg(long, env = "SURGE_PORT", global = true)]
    pub port: Option<u16>,

    /// Surge HTTP API key
    #[arg(long, env = "SURGE_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Talk HTTPS to the API
    #[arg(long, global = true)]
    pub https: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SURGE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SURGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SURGE_OUTPUT",
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
    /// Show every tracked resource
    #[command(alias = "st")]
    Status,

    /// Print resource changes as they happen (Ctrl-C to stop)
    Watch(WatchArgs),

    /// List and switch configuration profiles
    #[command(alias = "p")]
    Profile(ProfileArgs),

    /// Show or set the outbound mode
    #[command(alias = "mode")]
    Outbound(OutboundArgs),

    /// List and toggle features
    #[command(alias = "f")]
    Feature(FeatureArgs),

    /// Inspect policy groups and select policies
    #[command(alias = "g")]
    Group(GroupArgs),

    /// Show cumulative traffic
    Traffic,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides instance)
    #[arg(long, short = 'n')]
    pub interval: Option<u64>,
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// List available profiles
    #[command(alias = "ls")]
    List,
    /// Show the active profile
    Current,
    /// Switch to another profile
    Switch {
        /// Profile name
        name: String,
    },
    /// Reload the active profile
    Reload,
}

// ── Outbound ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OutboundArgs {
    #[command(subcommand)]
    pub command: OutboundCommand,
}

#[derive(Debug, Subcommand)]
pub enum OutboundCommand {
    /// Show the current outbound mode
    Get,
    /// Set the outbound mode
    Set {
        /// direct, proxy, or rule
        mode: String,
    },
}

// ── Feature ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FeatureArgs {
    #[command(subcommand)]
    pub command: FeatureCommand,
}

#[derive(Debug, Subcommand)]
pub enum FeatureCommand {
    /// List tracked feature toggles
    #[command(alias = "ls")]
    List,
    /// Enable a feature
    On {
        /// Feature name (e.g. mitm, capture)
        name: String,
    },
    /// Disable a feature
    Off {
        /// Feature name (e.g. mitm, capture)
        name: String,
    },
}

// ── Group ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// List policy groups
    #[command(alias = "ls")]
    List,
    /// Show one group's policies
    Show {
        /// Group name
        name: String,
    },
    /// Select the active policy of a group
    Select {
        /// Group name
        group: String,
        /// Policy name
        policy: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the resolved configuration (keys redacted)
    Show,
    /// Store an instance's API key in the system keyring
    SetKey,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
