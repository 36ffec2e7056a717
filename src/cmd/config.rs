use clap::{Args, Subcommand};

use crate::config::{AppConfig, SourceSelector};
use crate::domain::key::MatchStrategy;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the configuration resolved from the environment (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = AppConfig::load()?;

    println!("GitHub API URL: {}", cfg.github_api_url);
    println!("GitHub token: {}", mask_secret(&cfg.github_token));
    println!("Jira base URL: {}", display_value(&cfg.jira_base_url));
    println!("Jira email: {}", display_value(&cfg.jira_email));
    println!("Jira API token: {}", mask_secret(&cfg.jira_token));
    println!("Sources searched: {}", describe_selector(cfg.source_selector));
    match &cfg.match_strategy {
        MatchStrategy::Default => println!("Key matching: default pattern"),
        MatchStrategy::Custom {
            template,
            project_key,
        } => println!("Key matching: custom pattern '{template}' for project '{project_key}'"),
    }
    println!(
        "Skip branches: {}",
        cfg.skip_branches
            .as_ref()
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "<not set>".to_string())
    );
    println!("Fail on missing ticket: {}", cfg.fail_on_missing_ticket);

    Ok(())
}

fn describe_selector(selector: SourceSelector) -> &'static str {
    match selector {
        SourceSelector::Branch => "branch name only",
        SourceSelector::Title => "title only",
        SourceSelector::Both => "title, then branch name",
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.len() > 6 => {
            let prefix = &token[..3];
            let suffix = &token[token.len() - 3..];
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
