use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marge", version, about = "Inspect and act on GitLab merge requests")]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Log requests and responses to stderr (same as RUST_LOG=debug)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to a TOML config file
    #[arg(long, env = "MARGE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitLab instance URL, e.g. https://gitlab.com (overrides config file)
    #[arg(long, global = true)]
    pub gitlab_url: Option<String>,

    /// Personal access token (overrides config file)
    #[arg(long, global = true)]
    pub auth_token: Option<String>,

    /// Numeric ID of the project the merge requests belong to
    #[arg(long, short = 'p', global = true)]
    pub project_id: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum ColorChoice {
    /// Colorize output if stdout is a terminal
    #[default]
    Auto,
    /// Always colorize output
    Always,
    /// Never colorize output
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Remote(RemoteCommands),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Commands that talk to the GitLab server
#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// List opened merge requests, oldest first
    #[command(visible_alias = "ls")]
    List,
    /// Show one merge request
    Show {
        /// Merge request IID (project-scoped number)
        id: u64,
    },
    /// Post a comment on a merge request
    Comment {
        /// Merge request IID (project-scoped number)
        id: u64,
        /// Comment text
        message: String,
    },
    /// Assign a merge request to a user
    Assign {
        /// Merge request IID (project-scoped number)
        id: u64,
        /// Numeric user ID
        user_id: u64,
    },
    /// Remove the assignee of a merge request
    Unassign {
        /// Merge request IID (project-scoped number)
        id: u64,
    },
    /// Merge once the pipeline succeeds
    Accept {
        /// Merge request IID (project-scoped number)
        id: u64,
        /// Delete the source branch after merging
        #[arg(long)]
        remove_branch: bool,
        /// Only merge if the source branch is still at this commit
        /// (defaults to the commit seen when fetching)
        #[arg(long)]
        sha: Option<String>,
    },
    /// Print the GitLab server version
    Version,
}

impl Cli {
    /// Generate shell completions and write to stdout
    pub fn generate_completions(shell: Shell) {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "marge", &mut std::io::stdout());
    }
}
