mod cli;
mod color;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat, RemoteCommands};
use config::Config;
use gitlab_backend::GitLabClient;
use marge_core::{Api, MergeRequest, MergeRequestInfo};
use output::{output_done, output_error, output_list, output_result};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    color::init(cli.color);
    init_logging(cli.debug);

    if let Err(e) = run(&cli) {
        output_error(&e, cli.format);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Log to stderr, filtered by RUST_LOG (warn when unset)
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let command = match &cli.command {
        Commands::Remote(command) => command,
        // Completions need no configuration
        Commands::Completions { shell } => {
            Cli::generate_completions(*shell);
            return Ok(());
        }
    };

    let mut config = Config::load(cli.config.clone())?;
    config.merge_with_cli(cli.gitlab_url.clone(), cli.auth_token.clone(), cli.project_id);
    let connection = config.validate()?;

    let mut client = GitLabClient::new(connection.gitlab_url, connection.auth_token);
    if let Some(user_id) = config.sudo {
        client = client.with_sudo(user_id);
    }
    debug!(api = client.api_base_url(), "configured GitLab client");

    run_command(&client, &config, command, cli.format)
}

fn fetch_merge_request<'a>(
    api: &'a dyn Api,
    config: &Config,
    id: u64,
) -> Result<MergeRequest<'a, dyn Api + 'a>> {
    let project_id = config.require_project_id()?;
    MergeRequest::fetch_by_id(project_id, id, api)
        .with_context(|| format!("Failed to fetch merge request {}", id))
}

/// Run one command; merge request commands need a configured project
fn run_command(
    api: &dyn Api,
    config: &Config,
    command: &RemoteCommands,
    format: OutputFormat,
) -> Result<()> {
    let fetch = |id: u64| fetch_merge_request(api, config, id);

    match command {
        RemoteCommands::Version => {
            let version = api.version().context("Failed to fetch GitLab version")?;
            output_done(&version, format);
        }
        RemoteCommands::List => {
            let opened = MergeRequest::fetch_all_opened(config.require_project_id()?, api)
                .context("Failed to list opened merge requests")?;
            let infos: Vec<MergeRequestInfo> =
                opened.iter().map(|mr| (**mr.info()).clone()).collect();
            output_list(&infos, format);
        }
        RemoteCommands::Show { id } => {
            let mr = fetch(*id)?;
            output_result(&**mr.info(), format);
        }
        RemoteCommands::Comment { id, message } => {
            let mr = fetch(*id)?;
            mr.comment(message).context("Failed to post comment")?;
            output_done(&format!("Commented on !{}", mr.iid()), format);
        }
        RemoteCommands::Assign { id, user_id } => {
            let mr = fetch(*id)?;
            mr.assign_to(*user_id).context("Failed to assign")?;
            output_done(&format!("Assigned !{} to user {}", mr.iid(), user_id), format);
        }
        RemoteCommands::Unassign { id } => {
            let mr = fetch(*id)?;
            mr.unassign().context("Failed to unassign")?;
            output_done(&format!("Unassigned !{}", mr.iid()), format);
        }
        RemoteCommands::Accept {
            id,
            remove_branch,
            sha,
        } => {
            let mr = fetch(*id)?;
            mr.accept(*remove_branch, sha.as_deref())
                .context("Failed to accept merge request")?;
            output_done(
                &format!(
                    "Accepted !{} at {}; it merges when the pipeline succeeds",
                    mr.iid(),
                    sha.as_deref()
                        .or(mr.sha())
                        .unwrap_or("the current source branch tip")
                ),
                format,
            );
        }
    }

    Ok(())
}
