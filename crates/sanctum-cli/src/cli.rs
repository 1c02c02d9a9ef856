use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use sanctum_core::VERSION;

/// Sanctum - PIN-gated credentials, notes and links
#[derive(Parser)]
#[command(name = "sanctum")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "SANCTUM_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file and an empty store
    Init(InitArgs),

    /// Inspect, set up or change the PIN
    Pin {
        #[command(subcommand)]
        command: PinCommand,
    },

    /// Manage credentials
    Cred {
        #[command(subcommand)]
        command: CredCommand,
    },

    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },

    /// Manage links
    Link {
        #[command(subcommand)]
        command: LinkCommand,
    },

    /// Delete every credential, note, link and the PIN
    Reset(ResetArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path of the store database
    #[arg(long, value_name = "PATH")]
    pub store: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum PinCommand {
    /// Show whether a PIN is set up
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Choose a PIN for the first time
    Setup,
    /// Replace the PIN (the current one is asked for)
    Change,
}

#[derive(Subcommand)]
pub enum CredCommand {
    /// Add a credential (requires a PIN to be set up)
    Add(CredAddArgs),
    /// List credentials without their passwords
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a credential with its decrypted password
    Show {
        /// Credential ID
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a credential
    Edit(CredEditArgs),
    /// Delete a credential
    Delete {
        /// Credential ID
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Arguments for `cred add`
#[derive(Args)]
pub struct CredAddArgs {
    /// Display name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Account username (also the password encryption key)
    #[arg(short, long)]
    pub username: String,

    /// Password (prompted for when omitted)
    #[arg(short, long, env = "SANCTUM_CRED_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for `cred edit`
#[derive(Args)]
pub struct CredEditArgs {
    /// Credential ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New username; the password is re-encrypted under it
    #[arg(short, long)]
    pub username: Option<String>,

    /// New password
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Add a note
    Add {
        /// Note content
        #[arg(value_name = "CONTENT")]
        content: String,

        /// Pin the note to the top of the list
        #[arg(long)]
        pin: bool,
    },
    /// List notes; locked notes show no content
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lock a note (sets up the PIN if there is none)
    Lock(NoteIdArgs),
    /// Unlock a note
    Unlock(NoteIdArgs),
    /// Pin a note
    Pin(NoteIdArgs),
    /// Unpin a note
    Unpin(NoteIdArgs),
    /// Delete a note
    Delete(NoteIdArgs),
}

#[derive(Args)]
pub struct NoteIdArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Subcommand)]
pub enum LinkCommand {
    /// Add a link
    Add {
        /// Link URL
        #[arg(value_name = "URL")]
        url: String,

        /// Link title
        #[arg(short, long)]
        title: Option<String>,
    },
    /// List links; hidden links are shown only with --reveal
    List {
        /// Include hidden links (asks for the PIN)
        #[arg(long)]
        reveal: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Hide a link
    Hide(LinkIdArgs),
    /// Unhide a link
    Unhide(LinkIdArgs),
}

#[derive(Args)]
pub struct LinkIdArgs {
    /// Link ID
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the `reset` command
#[derive(Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}
