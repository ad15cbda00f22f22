//! boardsync - keep GitHub Projects derived fields in step
//!
//! One invocation is one run: collect the board's items, write Size, Week
//! and Release where they disagree with Estimate and Due Date, then post the
//! due-date and QA notices that have not been posted yet.
//!
//! Every option can also be given through the environment variable named in
//! `--help`, which is how the scheduled workflow configures it.

use anyhow::{Context, Result};
use boardsync_core::{
    DateRangeInName, FieldNames, NextReleaseOnOrAfter, NoRelease, Orchestrator, RunReport,
    SyncConfig, TracingSink,
};
use boardsync_github::{GithubClient, GithubConfig, OwnerType, DEFAULT_ENDPOINT};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OwnerArg {
    Organization,
    User,
}

impl From<OwnerArg> for OwnerType {
    fn from(arg: OwnerArg) -> Self {
        match arg {
            OwnerArg::Organization => OwnerType::Organization,
            OwnerArg::User => OwnerType::User,
        }
    }
}

/// How release options are matched to due dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReleasePolicyArg {
    /// Option name holds `YYYY-MM-DD - YYYY-MM-DD`; inclusive window
    DateRange,
    /// Option name holds one release date; earliest on or after the due date
    NextRelease,
    /// Never set Release
    #[value(name = "none")]
    Disabled,
}

#[derive(Debug, Parser)]
#[command(name = "boardsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reconcile derived fields and post notices on a GitHub Projects board", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines and a JSON run report
    #[arg(long)]
    json: bool,

    /// API token (falls back to GH_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base or GraphQL endpoint URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_ENDPOINT)]
    api_url: String,

    /// Login of the organization or user owning the project
    #[arg(long, env = "REPOSITORY_OWNER")]
    owner: String,

    #[arg(long, env = "OWNER_TYPE", value_enum, default_value_t = OwnerArg::Organization)]
    owner_type: OwnerArg,

    /// Project number as shown in the project URL
    #[arg(long, env = "PROJECT_NUMBER")]
    project_number: u64,

    /// Log what would change without writing anything
    #[arg(long, env = "DRY_RUN", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    dry_run: bool,

    /// Include items whose issue is closed, and draft items
    #[arg(long, env = "ALL_ITEMS", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    all_items: bool,

    /// Repository (under --owner) of the issue that collects update summaries
    #[arg(long, env = "COMMENTS_ISSUE_REPO", requires = "comments_issue_number")]
    comments_issue_repo: Option<String>,

    #[arg(long, env = "COMMENTS_ISSUE_NUMBER", requires = "comments_issue_repo")]
    comments_issue_number: Option<u64>,

    #[arg(long, env = "RELEASE_POLICY", value_enum, default_value_t = ReleasePolicyArg::DateRange)]
    release_policy: ReleasePolicyArg,

    /// Status option that triggers the QA notice
    #[arg(long, env = "QA_STATUS", default_value = "QA Testing")]
    qa_status: String,

    #[arg(long, env = "DUE_DATE_FIELD", default_value = "Due Date")]
    due_date_field: String,

    #[arg(long, env = "RELEASE_FIELD", default_value = "Release")]
    release_field: String,

    #[arg(long, env = "WEEK_FIELD", default_value = "Week")]
    week_field: String,

    #[arg(long, env = "ESTIMATE_FIELD", default_value = "Estimate")]
    estimate_field: String,

    #[arg(long, env = "SIZE_FIELD", default_value = "Size")]
    size_field: String,

    #[arg(long, env = "STATUS_FIELD", default_value = "Status")]
    status_field: String,
}

impl Cli {
    fn field_names(&self) -> FieldNames {
        FieldNames {
            due_date: self.due_date_field.clone(),
            release: self.release_field.clone(),
            week: self.week_field.clone(),
            estimate: self.estimate_field.clone(),
            size: self.size_field.clone(),
            status: self.status_field.clone(),
        }
    }

    fn sync_config(&self) -> SyncConfig {
        let config = SyncConfig::new()
            .with_dry_run(self.dry_run)
            .with_open_only(!self.all_items)
            .with_fields(self.field_names())
            .with_qa_status(&self.qa_status);
        match (&self.comments_issue_repo, self.comments_issue_number) {
            (Some(repo), Some(number)) => config.with_summary_issue(repo, number),
            _ => config,
        }
    }

    fn github_config(&self, token: String) -> GithubConfig {
        GithubConfig::new(token, &self.owner, self.project_number)
            .with_endpoint(graphql_endpoint(&self.api_url))
            .with_owner_type(self.owner_type.into())
            .with_fields(self.field_names())
    }
}

/// Accept either the REST base URL CI runners export or the GraphQL URL itself.
fn graphql_endpoint(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    if trimmed.ends_with("/graphql") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/graphql")
    }
}

fn resolve_token(cli_token: Option<String>) -> Result<String> {
    cli_token
        .filter(|t| !t.is_empty())
        .or_else(|| std::env::var("GH_TOKEN").ok().filter(|t| !t.is_empty()))
        .context("No GitHub token: set GITHUB_TOKEN or GH_TOKEN, or pass --token")
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let mode = if report.dry_run { " (dry run)" } else { "" };
    println!("Run {}{}", report.run_id, mode);
    println!("Items collected:        {}", report.items_collected);
    println!("Items changed:          {}", report.items_changed);
    println!("Mutations applied:      {}", report.mutations_applied);
    println!("Mutation failures:      {}", report.mutation_failures);
    println!("Comments posted:        {}", report.comments_posted);
    println!("Already notified:       {}", report.already_notified);
    println!("Notification failures:  {}", report.notification_failures);
    if report.dry_run {
        println!("Skipped by dry run:     {}", report.dry_run_skipped);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    boardsync_core::init_tracing(cli.json, level);

    let token = resolve_token(cli.token.clone())?;
    let sync_config = cli.sync_config();
    let github_config = cli.github_config(token);
    info!(
        owner = %github_config.owner,
        project = github_config.project_number,
        dry_run = sync_config.dry_run,
        release_policy = ?cli.release_policy,
        "starting boardsync run"
    );

    let client = GithubClient::new(github_config).context("Failed to build GitHub client")?;

    let orchestrator = Orchestrator::new(&client, &TracingSink, sync_config);
    let orchestrator = match cli.release_policy {
        ReleasePolicyArg::DateRange => orchestrator.with_release_policy(DateRangeInName),
        ReleasePolicyArg::NextRelease => orchestrator.with_release_policy(NextReleaseOnOrAfter),
        ReleasePolicyArg::Disabled => orchestrator.with_release_policy(NoRelease),
    };

    let report = orchestrator
        .run()
        .await
        .with_context(|| format!("Sync of project {}/{} failed", cli.owner, cli.project_number))?;

    print_report(&report, cli.json)
}
