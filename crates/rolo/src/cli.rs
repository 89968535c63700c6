//! Clap derive structures for the `rolo` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rolo -- contact directory from the command line
#[derive(Debug, Parser)]
#[command(
    name = "rolo",
    version,
    about = "Manage your contact directory from the command line",
    long_about = "A CLI for the Rolo contact directory.\n\n\
        Log in once; the session is stored locally and reused until it\n\
        expires or you log out.",
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
    /// API server URL, e.g. https://host/api (overrides config file)
    #[arg(long, short = 's', env = "ROLO_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROLO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (default 30)
    #[arg(long, env = "ROLO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session locally
    Login(LoginArgs),

    /// Create an account and log in
    Register(RegisterArgs),

    /// Drop the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Change the account password
    Passwd,

    /// List contacts, one page at a time
    #[command(alias = "ls")]
    List(PageArgs),

    /// Search contacts by name, email, or phone
    Search(SearchArgs),

    /// Show one contact
    #[command(alias = "get")]
    Show { id: u64 },

    /// Create a contact
    #[command(alias = "add")]
    Create(ContactFields),

    /// Update a contact (unset fields keep their current value)
    #[command(alias = "edit")]
    Update {
        id: u64,
        #[command(flatten)]
        fields: ContactFields,
    },

    /// Delete a contact
    #[command(alias = "rm")]
    Delete { id: u64 },

    /// Import contacts from a .json or .csv file
    Import {
        /// Path to the import file
        file: PathBuf,
    },

    /// Export all contacts to a file
    Export(ExportArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        shell: clap_complete::Shell,
    },
}

// ── Command argument structs ─────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Password (prompted when omitted; prefer the prompt)
    #[arg(long, env = "ROLO_PASSWORD", hide_env = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "ROLO_PASSWORD", hide_env = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct PageArgs {
    /// Zero-based page number
    #[arg(long, default_value = "0")]
    pub page: u32,

    /// Page size
    #[arg(long)]
    pub size: Option<u32>,

    /// Field to sort by, e.g. lastName
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction
    #[arg(long, default_value = "asc")]
    pub sort_dir: SortDirArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortDirArg {
    Asc,
    Desc,
}

impl From<SortDirArg> for rolo_api::SortDir {
    fn from(dir: SortDirArg) -> Self {
        match dir {
            SortDirArg::Asc => Self::Asc,
            SortDirArg::Desc => Self::Desc,
        }
    }
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query string
    pub query: String,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Contact fields shared by create and update.
///
/// `--email` and `--phone` repeat, with an optional type suffix:
/// `--email a@x.com:work --phone +155501:home`. Untyped values default
/// to PERSONAL.
#[derive(Debug, Args)]
pub struct ContactFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// Email as ADDRESS[:TYPE] (work, personal, other); repeatable
    #[arg(long = "email")]
    pub emails: Vec<String>,

    /// Phone as NUMBER[:TYPE] (work, home, personal, other); repeatable
    #[arg(long = "phone")]
    pub phones: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export format
    #[arg(long, default_value = "json")]
    pub format: FormatArg,

    /// Destination path (defaults to contacts.<ext> in the current dir)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for rolo_api::TransferFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}
