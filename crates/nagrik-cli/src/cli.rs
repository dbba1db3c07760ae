use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use nagrik_core::models::{GeoPoint, IssueCategory};

#[derive(Parser)]
#[command(name = "nagrik")]
#[command(about = "File civic issue reports, online or offline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local draft store
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Treat the reporting endpoint as unreachable
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// File a new report (queued locally when offline)
    #[command(alias = "new")]
    Report {
        /// Issue category
        #[arg(short, long)]
        category: IssueCategory,
        /// Short title (defaults to the category name)
        #[arg(short, long)]
        title: Option<String>,
        /// Location as "lat,lng"
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        location: Option<GeoPoint>,
        /// Street address or landmark
        #[arg(long)]
        address: Option<String>,
        /// Photo to attach (repeatable)
        #[arg(long = "photo", value_name = "PATH")]
        photos: Vec<PathBuf>,
        /// Voice note to attach
        #[arg(long, value_name = "PATH")]
        voice_note: Option<PathBuf>,
        /// Issue description (read from stdin when omitted)
        description: Vec<String>,
    },
    /// Inspect the offline queue
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Deliver every queued report now
    Sync,
    /// Show connection state, queued reports and last sync time
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stay running and sync whenever the connection comes back
    Watch,
    /// Read or change local preferences
    Setting {
        #[command(subcommand)]
        command: SettingCommands,
    },
    /// Show or change client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// List queued reports
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one queued report
    Show {
        /// Report ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Discard a queued report without delivering it
    Remove {
        /// Report ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SettingCommands {
    /// Print a preference value
    Get { key: String },
    /// Store a preference value (true/false, numbers and JSON are detected)
    Set { key: String, value: String },
    /// List every stored preference
    List,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show,
    /// Update the config file
    Set {
        /// Reporting endpoint base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Bearer token sent with deliveries
        #[arg(long, value_name = "TOKEN")]
        api_token: Option<String>,
        /// Per-report delivery timeout
        #[arg(long, value_name = "SECS")]
        delivery_timeout_secs: Option<u64>,
        /// Reachability polling interval for `watch`
        #[arg(long, value_name = "SECS")]
        probe_interval_secs: Option<u64>,
    },
}
