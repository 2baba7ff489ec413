//! Clap derive structures for the `sensornet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sensornet -- browse telemetry and drive actuators on a sensornet dashboard
#[derive(Debug, Parser)]
#[command(
    name = "sensornet",
    version,
    about = "Browse IoT telemetry and control devices from the command line",
    long_about = "A CLI for the sensornet IoT dashboard server.\n\n\
        Lists and searches telemetry and the actuator action log, and toggles\n\
        devices, reporting state only once the server confirms it.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "SENSORNET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 'u', env = "SENSORNET_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SENSORNET_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SENSORNET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SENSORNET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one record per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, sort and search telemetry records
    #[command(alias = "s")]
    Sensors(SensorsArgs),

    /// List and filter the actuator action log
    #[command(alias = "a", alias = "history")]
    Actions(ActionsArgs),

    /// Show the latest readout and confirmed device states
    Status,

    /// Toggle a device and wait for the server to confirm it
    #[command(alias = "t")]
    Toggle(ToggleArgs),

    /// Stream device state changes from the push channel
    Watch(WatchArgs),

    /// Show or edit the operator profile
    Profile(ProfileArgs),

    /// Manage CLI configuration and server profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Paging Arguments ──────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number (clamped to the available pages)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Records per page (minimum 10)
    #[arg(long, short = 'n', default_value = "10")]
    pub page_size: String,
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    /// Column to sort by
    #[arg(long, default_value = "time", value_parser = ["id", "temperature", "humidity", "light", "time"])]
    pub sort: String,

    /// Sort direction
    #[arg(long, default_value = "asc")]
    pub order: Order,

    /// Search term (switches to the search endpoint)
    #[arg(long)]
    pub search: Option<String>,

    /// Column the search term applies to
    #[arg(long, default_value = "time", value_parser = ["time", "temperature", "humidity", "light"])]
    pub field: String,

    #[command(flatten)]
    pub paging: PageArgs,
}

// ── Actions ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActionsArgs {
    /// Only this device (device1..device3, aircon, light, fan)
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Only this action
    #[arg(long)]
    pub action: Option<OnOff>,

    /// Search by timestamp text, e.g. "2025-08-30 10:"
    #[arg(long)]
    pub search: Option<String>,

    /// Sort direction by time
    #[arg(long, default_value = "desc")]
    pub order: Order,

    #[command(flatten)]
    pub paging: PageArgs,
}

// ── Toggle / Watch ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Device to toggle (device1..device3, aircon, light, fan)
    pub device: String,

    /// Seconds to wait for the push confirmation (defaults to the profile setting)
    #[arg(long, value_name = "SECS")]
    pub wait: Option<u64>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many events
    #[arg(long, short = 'c')]
    pub count: Option<usize>,
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the operator profile
    Show,

    /// Set one profile field
    Set {
        /// name, student-id, github, report-url, api-docs-url, avatar
        field: String,
        value: String,
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

    /// Show the effective configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Add a server profile
    Init {
        /// Server root URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        server: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Replace an existing profile with the same name
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
