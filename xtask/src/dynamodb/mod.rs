//! DynamoDB infrastructure management commands.

mod client;
mod config;
mod deploy;
mod error;
mod planning;

pub use error::{DynamodbError, Result};

use crate::prelude::*;
use dialoguer::Confirm;
use planning::{DeployPlan, DestroyPlan};

/// DynamoDB infrastructure management commands.
#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

/// Available DynamoDB actions.
#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Create the items table or bring its capacity in line with the stack.
    #[command(long_about = "Create the items table declared in the CloudFormation
description (single string partition key, provisioned capacity), or bring the
capacity of an existing table in line with it.

A plan is printed before anything changes.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to us-east-1)
  AWS_PROFILE         - AWS profile to use for credentials")]
    Deploy(TableArgs),
    /// Delete the items table and all of its data.
    Destroy(TableArgs),
}

/// Arguments shared by every table action.
#[derive(Debug, clap::Args)]
pub struct TableArgs {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Table name to use (defaults to the one in the stack).
    #[arg(long)]
    pub table_name: Option<String>,
}

/// Main entry point for dynamodb command.
pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    let console = Console::new(&global);
    match command.action {
        DynamodbAction::Deploy(args) => run_deploy(&args, &console).await,
        DynamodbAction::Destroy(args) => run_destroy(&args, &console).await,
    }
}

/// Output gated on `--silent`/`--verbose`, plus the confirmation prompt.
struct Console {
    silent: bool,
    verbose: bool,
}

impl Console {
    fn new(global: &crate::Global) -> Self {
        Self {
            silent: global.is_silent(),
            verbose: global.is_verbose(),
        }
    }

    fn say(&self, line: String) {
        if !self.silent {
            aprintln!("{line}");
        }
    }

    fn plan(&self, title: String, lines: Vec<String>) {
        if self.silent {
            return;
        }
        aprintln!("{title}");
        for line in lines {
            aprintln!("  {}", p_plan(&line));
        }
        aprintln!();
    }

    /// Asks before a change unless `force` is set.
    fn confirm(&self, prompt: &str, default: bool, force: bool) -> Result<()> {
        if force {
            return Ok(());
        }
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| DynamodbError::Prompt(e.to_string()))?;
        if confirmed {
            Ok(())
        } else {
            Err(DynamodbError::UserCancelled)
        }
    }
}

/// What the command does once a plan is known.
#[derive(Debug, PartialEq, Eq)]
enum Next {
    /// Nothing to apply; print the message and stop.
    Done(&'static str),
    /// The plan can't be applied; executing it reports why.
    Refuse(&'static str),
    /// Ask, then apply.
    Apply(&'static str),
}

fn next_for_deploy(plan: &DeployPlan) -> Next {
    match plan {
        DeployPlan::NoChanges { .. } => Next::Done("Infrastructure is up to date."),
        DeployPlan::Incompatible { .. } => Next::Refuse(
            "Destroy the table first with `cargo xtask dynamodb destroy`.",
        ),
        DeployPlan::CreateTable { .. } | DeployPlan::UpdateThroughput { .. } => {
            Next::Apply("Apply these changes?")
        }
    }
}

fn next_for_destroy(plan: &DestroyPlan) -> Next {
    match plan {
        DestroyPlan::AlreadyGone { .. } => Next::Done("Nothing to destroy."),
        DestroyPlan::DeleteTable { .. } => {
            Next::Apply("Are you sure you want to delete this table? ALL DATA WILL BE LOST")
        }
    }
}

/// Resolves the table config and connects to the target endpoint.
async fn connect(
    args: &TableArgs,
    console: &Console,
) -> Result<(aws_sdk_dynamodb::Client, config::TableConfig)> {
    let aws_config = client::AwsConfig::default();

    let mut table_config = config::items_table_config()?;
    if let Some(name) = &args.table_name {
        table_config = table_config.with_table_name(name);
    }

    console.say(format!("{} {}", p_b("Target:"), aws_config.target_display()));
    if console.verbose {
        console.say(format!("{} {:?}", p_b("Table:"), table_config));
    }
    console.say(String::new());

    let dynamo_client = client::create_client(&aws_config).await?;
    Ok((dynamo_client, table_config))
}

async fn run_deploy(args: &TableArgs, console: &Console) -> Result<()> {
    let (dynamo_client, table_config) = connect(args, console).await?;
    let current = client::get_table_state(&dynamo_client, &table_config.table_name).await?;
    let plan = planning::calculate_deploy_plan(current.as_ref(), &table_config);

    console.plan(p_c("Deploy Plan:"), planning::format_deploy_plan(&plan));

    match next_for_deploy(&plan) {
        Next::Done(message) => {
            console.say(p_g(message));
            return Ok(());
        }
        Next::Refuse(hint) => {
            console.say(p_r(hint));
            return deploy::execute_deploy_plan(&dynamo_client, &plan).await;
        }
        Next::Apply(prompt) => console.confirm(prompt, true, args.force)?,
    }

    console.say(p_b("Applying changes..."));
    deploy::execute_deploy_plan(&dynamo_client, &plan).await?;
    console.say(p_g("Infrastructure deployed successfully."));
    Ok(())
}

async fn run_destroy(args: &TableArgs, console: &Console) -> Result<()> {
    let (dynamo_client, table_config) = connect(args, console).await?;
    let current = client::get_table_state(&dynamo_client, &table_config.table_name).await?;
    let plan = planning::calculate_destroy_plan(current.as_ref(), &table_config.table_name);

    console.plan(p_y("Destroy Plan:"), planning::format_destroy_plan(&plan));

    match next_for_destroy(&plan) {
        Next::Done(message) | Next::Refuse(message) => {
            console.say(p_g(message));
            return Ok(());
        }
        Next::Apply(prompt) => console.confirm(prompt, false, args.force)?,
    }

    console.say(p_b("Deleting table..."));
    deploy::execute_destroy_plan(&dynamo_client, &plan).await?;
    console.say(p_g("Table destroyed successfully."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> config::TableConfig {
        config::items_table_config().unwrap()
    }

    #[test]
    fn test_create_and_update_ask_first() {
        let create = planning::calculate_deploy_plan(None, &table());
        assert_eq!(next_for_deploy(&create), Next::Apply("Apply these changes?"));

        let update = DeployPlan::UpdateThroughput {
            table_name: "items".to_string(),
            current: None,
            desired: table().throughput,
        };
        assert!(matches!(next_for_deploy(&update), Next::Apply(_)));
    }

    #[test]
    fn test_up_to_date_table_stops() {
        let plan = DeployPlan::NoChanges {
            table_name: "items".to_string(),
        };
        assert!(matches!(next_for_deploy(&plan), Next::Done(_)));
    }

    #[test]
    fn test_incompatible_table_points_at_destroy() {
        let plan = DeployPlan::Incompatible {
            table_name: "items".to_string(),
            reason: "partition key is pk (S), expected id (S)".to_string(),
        };
        let Next::Refuse(hint) = next_for_deploy(&plan) else {
            panic!("expected a refusal");
        };
        assert!(hint.contains("dynamodb destroy"));
    }

    #[test]
    fn test_destroy_requires_existing_table() {
        let gone = planning::calculate_destroy_plan(None, "items");
        assert_eq!(next_for_destroy(&gone), Next::Done("Nothing to destroy."));

        let present = DestroyPlan::DeleteTable {
            table_name: "items".to_string(),
        };
        assert!(matches!(next_for_destroy(&present), Next::Apply(_)));
    }

    #[test]
    fn test_force_skips_the_prompt() {
        let console = Console {
            silent: true,
            verbose: false,
        };
        assert!(console.confirm("never shown", false, true).is_ok());
    }
}
