mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::sync::{self, SyncCommandArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::pull_request::{PullRequestRef, PullRequestSources};
use crate::error::AppResult;
use crate::infra::github::GithubClient;
use crate::infra::jira::JiraClient;

#[derive(Parser)]
#[command(
    name = "prjira",
    author,
    version,
    about = "Sync pull request labels and description with the linked Jira ticket"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the ticket key for a pull request and sync labels and description.
    Sync(SyncArgs),
    /// Inspect CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct SyncArgs {
    /// Repository owner (organization or user).
    #[arg(long)]
    owner: String,
    /// Repository name.
    #[arg(long)]
    repo: String,
    /// Pull request number.
    #[arg(long)]
    number: u64,
    /// Pull request title.
    #[arg(long, default_value = "")]
    title: String,
    /// Head branch name.
    #[arg(long, default_value = "")]
    branch: String,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Sync(args) => run_sync(args).await,
    }
}

async fn run_sync(args: SyncArgs) -> AppResult<()> {
    let config = AppConfig::load()?;

    if config.github_token.is_none() {
        eprintln!("Warning: GitHub token not configured; label and description updates will fail.");
    }
    if config.jira_base_url.is_none() {
        eprintln!("Warning: Jira base URL not configured; ticket lookups will fail.");
    }
    if config.jira_email.is_none() || config.jira_token.is_none() {
        eprintln!("Warning: Jira credentials not configured; ticket lookups will fail.");
    }

    let code_host = Arc::new(GithubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
    ));
    let issue_tracker = Arc::new(JiraClient::new(
        config.jira_base_url.clone(),
        config.jira_email.clone(),
        config.jira_token.clone(),
    ));

    let pr = PullRequestRef {
        owner: args.owner,
        repo: args.repo,
        number: args.number,
    };
    let sources = PullRequestSources {
        title: args.title,
        branch: args.branch,
    };

    let context = AppContext::new(config, code_host, issue_tracker);

    match sync::run(&context, SyncCommandArgs { pr: pr.clone(), sources }).await? {
        Some(outcome) => {
            println!(
                "Synced {pr} with {}. Labels applied: {}. Description {}.",
                outcome.key,
                if outcome.labels_applied.is_empty() {
                    "none".to_string()
                } else {
                    outcome.labels_applied.join(", ")
                },
                if outcome.description_updated {
                    "updated"
                } else {
                    "unchanged"
                }
            );
        }
        None => println!("Nothing to sync for {pr}."),
    }

    Ok(())
}
