//! Venture marketplace console — entry point.
//!
//! Signs in with the given credentials, runs one screen or action against
//! the marketplace API and prints the result.  Logs go to stderr.

mod api;
mod cli;
mod errors;
mod login;
mod render;
mod screens;
mod validation;

use clap::Parser;
use remote_resource::{ClientConfig, ResourceController, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{AccountUser, Credentials, ProfileChanges, ProjectFilter, WalletAction};
use cli::{Cli, Command};
use errors::Result;
use screens::{dashboard, investments, profile, projects, reports, staff, wallet};
use validation::{build_project, build_report, build_report_decision};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load optional .env file (ignored if missing) before reading arguments,
    // so it can supply the credential variables too.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    info!("Marketplace API at {}", config.base_url);

    let anonymous = ResourceController::from_config(&config, Session::Anonymous)?;
    let credentials = Credentials {
        email: cli.email,
        password: cli.password,
    };
    let (controller, account) = login::login(&anonymous, &credentials)
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {e}"))?;

    let output = execute(&controller, &account, cli.command).await?;
    print!("{output}");
    Ok(())
}

async fn execute(
    controller: &ResourceController,
    account: &AccountUser,
    command: Command,
) -> Result<String> {
    match command {
        Command::Dashboard => dashboard::dashboard(controller, account).await,

        Command::Projects { id: Some(id) } => projects::detail(controller, &id).await,
        Command::Projects { id: None } => Ok(projects::approved(controller).await),
        Command::MyProjects => projects::own(controller).await,
        Command::Invest { project, amount } => projects::invest(controller, &project, &amount).await,
        Command::CreateProject {
            title,
            description,
            goal,
            deadline,
            img,
        } => {
            let project = build_project(&title, &description, &goal, &deadline, &img)?;
            projects::create(controller, account, project).await
        }

        Command::Wallet => wallet::show(controller).await,
        Command::Deposit { amount } => {
            wallet::transact(controller, WalletAction::Deposit, &amount).await
        }
        Command::Withdraw { amount } => {
            wallet::transact(controller, WalletAction::Withdraw, &amount).await
        }

        Command::History => investments::history(controller).await,
        Command::Received { project } => {
            investments::received(controller, &ProjectFilter::parse(&project)).await
        }

        Command::Report {
            user,
            reason,
            details,
            project,
            evidence,
        } => {
            let report = build_report(&user, &reason, &details, project.as_deref(), &evidence)?;
            reports::submit(controller, report).await
        }
        Command::MyReports => reports::mine(controller).await,
        Command::Reports { status } => reports::staff_reports(controller, status.into()).await,
        Command::ProcessReport {
            id,
            outcome,
            action,
            comment,
            days,
        } => {
            let decision = build_report_decision(outcome.into(), action, &comment, days)?;
            reports::process(controller, &id, decision).await
        }
        Command::RemovePenalties { user } => reports::remove_penalties(controller, &user).await,

        Command::PendingProjects => staff::pending_projects(controller).await,
        Command::ReviewProject { id, decision } => {
            staff::review_project(controller, decision.into(), &id).await
        }
        Command::PendingProfiles => staff::pending_profiles(controller).await,
        Command::ReviewProfile {
            id,
            decision,
            notes,
        } => staff::review_profile(controller, &id, decision.into(), &notes).await,

        Command::Profile => profile::show(controller).await,
        Command::UpdateProfile {
            name,
            contact,
            image,
            documents,
        } => {
            let changes = ProfileChanges {
                name,
                contact_info: contact,
                image,
                documents,
            };
            profile::request_update(controller, changes).await
        }
    }
}
