//! Project listings, investing and project creation.

use std::fmt::Write as _;

use remote_resource::{Dependencies, MutationRequest, ResourceController, Role, ViewState};
use tracing::info;

use super::{ids, load, require_role};
use crate::api::{
    self, AccountUser, CreatedProject, InvestmentReceipt, NewInvestment, NewProject, Project, WalletBalance,
};
use crate::errors::{ConsoleError, Result};
use crate::render::{money, section};
use crate::validation::{check_id, check_investment, parse_amount};

pub(crate) fn project_rows(projects: &[Project]) -> String {
    let mut out = String::new();
    for project in projects {
        let _ = writeln!(out, "  [{}] {}", project.id, project.title);
        if !project.description.is_empty() {
            let _ = writeln!(out, "      {}", project.description);
        }
        let _ = writeln!(
            out,
            "      Goal: {}  Raised: {} ({:.1}%)  Remaining: {}",
            money(project.funding_goal),
            money(project.current_investment),
            project.progress_percent(),
            money(project.remaining()),
        );
        if let Some(creator) = project.created_by.as_ref().and_then(|c| c.name()) {
            let _ = writeln!(out, "      By: {creator}");
        }
        if let Some(deadline) = &project.deadline {
            let _ = writeln!(out, "      Deadline: {deadline}");
        }
    }
    out
}

fn render(title: &str, state: &ViewState<Vec<Project>>, empty: &str) -> String {
    section(title, state, |p| p.is_empty(), empty, |p| project_rows(p))
}

/// Approved projects open for investment.
pub async fn approved(controller: &ResourceController) -> String {
    let projects = controller.resource::<Vec<Project>>(ids::APPROVED_PROJECTS);
    projects.declare(api::APPROVED_PROJECTS, Dependencies::none());
    render(
        "Available Projects",
        &projects.settled().await,
        "No projects available for investment right now.",
    )
}

/// The signed-in entrepreneur's own projects.
pub async fn own(controller: &ResourceController) -> Result<String> {
    require_role(controller, Role::Entrepreneur)?;
    let projects = controller.resource::<Vec<Project>>(ids::OWN_PROJECTS);
    projects.declare(api::ENTREPRENEUR_PROJECTS, Dependencies::none());
    Ok(render(
        "My Projects",
        &projects.settled().await,
        "You haven't created any projects yet.",
    ))
}

pub async fn invest(
    controller: &ResourceController,
    project_id: &str,
    raw_amount: &str,
) -> Result<String> {
    require_role(controller, Role::Investor)?;
    let project_id = check_id("project", project_id)?;
    let amount = parse_amount(raw_amount)?;

    let wallet = controller.resource::<WalletBalance>(ids::WALLET_BALANCE);
    wallet.declare(api::WALLET_BALANCE, Dependencies::none());
    let projects = controller.resource::<Vec<Project>>(ids::APPROVED_PROJECTS);
    projects.declare(api::APPROVED_PROJECTS, Dependencies::none());

    check_investment(amount, load(&wallet).await?.balance)?;

    let request = MutationRequest::post(api::INVESTMENTS).json(&NewInvestment {
        project_id: project_id.to_string(),
        amount,
    })?;
    let receipt: InvestmentReceipt = controller
        .mutate(
            request,
            &[ids::APPROVED_PROJECTS.into(), ids::INVESTOR_HISTORY.into()],
        )
        .await?;
    info!(project_id, amount, "investment placed");

    match receipt.updated_balance {
        Some(balance) => wallet.replace_data(WalletBalance { balance }),
        None => {
            wallet.revalidate();
        }
    }

    let mut out = format!("Investment successful! You invested {}.\n", money(amount));
    if let Some(balance) = wallet.settled().await.data() {
        let _ = writeln!(out, "Wallet balance: {}", money(balance.balance));
    }
    out.push_str(&render(
        "Available Projects",
        &projects.settled().await,
        "No projects available for investment right now.",
    ));
    Ok(out)
}

/// Submit a new project.  Refused locally while the account carries a
/// project restriction.
pub async fn create(
    controller: &ResourceController,
    account: &AccountUser,
    project: NewProject,
) -> Result<String> {
    require_role(controller, Role::Entrepreneur)?;
    if account.penalties.as_ref().is_some_and(|p| p.is_project_restricted) {
        return Err(ConsoleError::validation(
            "Project creation is restricted for your account",
        ));
    }

    let request = MutationRequest::post(api::CREATE_PROJECT).json(&project)?;
    let created: CreatedProject = controller
        .mutate(request, &[ids::OWN_PROJECTS.into()])
        .await?;

    match created.inserted_id {
        Some(id) => {
            info!(%id, "project created");
            Ok(format!(
                "Project \"{}\" submitted for review (id {id}).\n",
                project.title
            ))
        }
        None => Err(ConsoleError::Rejected(
            created
                .message
                .unwrap_or_else(|| "Failed to add project".to_string()),
        )),
    }
}

/// Full detail for one project.
pub async fn detail(controller: &ResourceController, project_id: &str) -> Result<String> {
    let project_id = check_id("project", project_id)?;
    let project = controller.resource::<Project>(ids::project(project_id));
    project.declare(
        api::project_detail(project_id),
        Dependencies::new().with(project_id),
    );
    let state = project.settled().await;
    Ok(section(
        "Project",
        &state,
        |_| false,
        "",
        |p| project_rows(std::slice::from_ref(p)),
    ))
}
