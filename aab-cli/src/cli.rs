//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use aab_core::EncryptionMode;
use aab_core::models::SessionType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Command-line interface for encrypted `.aab` address books
#[derive(Parser)]
#[command(name = "aab")]
#[command(author, version, about = "Encrypted address book command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "AAB_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Password of the address book file (prompted for when needed)
    #[arg(short, long, global = true, env = "AAB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new address book file
    #[command(about = "Create a new, empty address book")]
    New {
        /// File to create
        file: PathBuf,

        /// Book name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Book comment
        #[arg(long, default_value = "")]
        comment: String,

        /// Encryption (defaults to the configured default)
        #[arg(short, long)]
        encryption: Option<EncryptionMode>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show book properties and statistics
    #[command(about = "Show address book properties")]
    Info {
        /// Address book file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Print the group tree
    #[command(about = "Print groups and computers as a tree")]
    Tree {
        /// Address book file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Group management
    #[command(subcommand)]
    Group(GroupCommands),

    /// Computer management
    #[command(subcommand)]
    Computer(ComputerCommands),

    /// Resolve the effective connection parameters of a computer
    #[command(about = "Resolve how a computer would be reached")]
    Resolve {
        /// Address book file
        file: PathBuf,

        /// Computer path ("Office/PC1") or ID
        computer: String,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Change the encryption or password of a book
    #[command(about = "Change encryption type or password")]
    Encrypt {
        /// Address book file
        file: PathBuf,

        /// New encryption type
        #[arg(short, long, default_value = "chacha20-poly1305")]
        encryption: EncryptionMode,

        /// New password (prompted for when omitted)
        #[arg(long, env = "AAB_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },

    /// Book-level default router
    #[command(subcommand)]
    Router(RouterCommands),

    /// Application settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page
    #[command(about = "Generate a man page on stdout")]
    Manpage,
}

/// Group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Add a group
    Add {
        /// Address book file
        file: PathBuf,

        /// Group name
        name: String,

        /// Parent group path (root when omitted)
        #[arg(long)]
        parent: Option<String>,

        /// Group comment
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Rename a group or change its comment
    Rename {
        /// Address book file
        file: PathBuf,

        /// Group path
        group: String,

        /// New name
        name: String,

        /// New comment (unchanged when omitted)
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a group with everything below it
    Delete {
        /// Address book file
        file: PathBuf,

        /// Group path
        group: String,
    },

    /// Move a group under another group
    Move {
        /// Address book file
        file: PathBuf,

        /// Group path
        group: String,

        /// New parent group path ("/" for the root)
        parent: String,
    },
}

/// Connection fields shared by `computer add` and `computer update`
#[derive(Args)]
pub struct ComputerFields {
    /// Address (`host[:port]`) or router host ID
    #[arg(short, long)]
    pub address: Option<String>,

    /// User name on the remote computer
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password on the remote computer
    #[arg(long, env = "AAB_COMPUTER_PASSWORD", hide_env_values = true)]
    pub computer_password: Option<String>,

    /// Session type (manage, view, file-transfer)
    #[arg(short, long)]
    pub session: Option<SessionType>,

    /// Comment
    #[arg(long)]
    pub comment: Option<String>,
}

/// Computer subcommands
#[derive(Subcommand)]
pub enum ComputerCommands {
    /// Add a computer
    Add {
        /// Address book file
        file: PathBuf,

        /// Computer name
        name: String,

        /// Group path (root when omitted)
        #[arg(short, long)]
        group: Option<String>,

        #[command(flatten)]
        fields: ComputerFields,
    },

    /// Show a computer
    Show {
        /// Address book file
        file: PathBuf,

        /// Computer path or ID
        computer: String,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Update a computer
    Update {
        /// Address book file
        file: PathBuf,

        /// Computer path or ID
        computer: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ComputerFields,
    },

    /// Delete a computer
    Delete {
        /// Address book file
        file: PathBuf,

        /// Computer path or ID
        computer: String,
    },

    /// Move a computer to another group
    Move {
        /// Address book file
        file: PathBuf,

        /// Computer path or ID
        computer: String,

        /// Target group path ("/" for the root)
        group: String,
    },

    /// Copy a computer within its group
    Copy {
        /// Address book file
        file: PathBuf,

        /// Computer path or ID
        computer: String,
    },
}

/// Router subcommands
#[derive(Subcommand)]
pub enum RouterCommands {
    /// Show the default router
    Show {
        /// Address book file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Set the default router
    Set {
        /// Address book file
        file: PathBuf,

        /// Router address (`host[:port]`)
        #[arg(short, long)]
        address: String,

        /// User name on the router
        #[arg(short, long)]
        user: String,

        /// Router password (prompted for when omitted)
        #[arg(long, env = "AAB_ROUTER_PASSWORD", hide_env_values = true)]
        router_password: Option<String>,
    },

    /// Remove the default router
    Clear {
        /// Address book file
        file: PathBuf,
    },
}

/// Settings subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Change one setting and write the settings file
    Set {
        /// Setting to change
        #[arg(value_enum)]
        key: SettingKey,

        /// New value ("" clears the log file)
        value: String,
    },

    /// Write the default settings
    Reset,
}

/// Settings that `config set` can change
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SettingKey {
    /// Encryption for new books (none, chacha20-poly1305)
    DefaultEncryption,
    /// Argon2id memory cost in KiB
    KdfMemory,
    /// Argon2id passes
    KdfIterations,
    /// Argon2id lanes
    KdfParallelism,
    /// Log level (error, warn, info, debug, trace)
    LogLevel,
    /// Log file path
    LogFile,
}

impl SettingKey {
    /// Key path in config.toml
    pub const fn field(self) -> &'static str {
        match self {
            Self::DefaultEncryption => "security.default_encryption",
            Self::KdfMemory => "security.kdf.memory_kib",
            Self::KdfIterations => "security.kdf.iterations",
            Self::KdfParallelism => "security.kdf.parallelism",
            Self::LogLevel => "logging.level",
            Self::LogFile => "logging.file",
        }
    }
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Output as JSON
    Json,
}
