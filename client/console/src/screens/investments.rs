//! Investment history for investors, investments received for entrepreneurs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use remote_resource::{Dependencies, Resource, ResourceController, Role, ViewState};

use super::{ids, require_role};
use crate::api::{self, InvestorHistory, Project, ProjectFilter, ReceivedInvestments, UserSummary};
use crate::errors::Result;
use crate::render::{date, money, section};
use crate::validation::check_id;

/// Investments received, filterable by project.  The filter is a dependency
/// of the investments resource, so changing it re-fetches while the previous
/// list stays available as stale data.
pub struct InvestmentsReceived {
    projects: Resource<Vec<Project>>,
    investments: Resource<ReceivedInvestments>,
}

impl InvestmentsReceived {
    pub fn mount(controller: &ResourceController) -> Self {
        let projects = controller.resource::<Vec<Project>>(ids::OWN_PROJECTS);
        projects.declare(api::ENTREPRENEUR_PROJECTS, Dependencies::none());
        InvestmentsReceived {
            projects,
            investments: controller.resource(ids::RECEIVED_INVESTMENTS),
        }
    }

    pub fn select(&self, filter: &ProjectFilter) -> ViewState<ReceivedInvestments> {
        self.investments.declare(
            api::received_investments(filter),
            Dependencies::new().with(filter.key()),
        )
    }

    pub async fn render(&self, filter: &ProjectFilter) -> String {
        let (projects, investments) =
            tokio::join!(self.projects.settled(), self.investments.settled());

        let mut out = String::from("\nFilter by project: all");
        for project in projects.data().into_iter().flatten() {
            let selected = matches!(filter, ProjectFilter::Project(id) if *id == project.id);
            let marker = if selected { "*" } else { "" };
            let _ = write!(out, " | {marker}{} ({})", project.id, project.title);
        }
        out.push('\n');

        let empty = match filter {
            ProjectFilter::All => "No investments have been made in your projects yet.",
            ProjectFilter::Project(_) => "No investments have been made for this project yet.",
        };
        out.push_str(&section(
            "Investments Received",
            &investments,
            |r| r.investments.is_empty(),
            empty,
            |r| {
                let mut rows = String::new();
                let mut total = 0.0;
                for inv in &r.investments {
                    total += inv.amount;
                    let project = inv
                        .project
                        .as_ref()
                        .map(|p| p.title().unwrap_or(p.id()).to_string())
                        .unwrap_or_else(|| "Unknown project".to_string());
                    let investor = inv
                        .investor
                        .as_ref()
                        .map(|i| i.name().unwrap_or(i.id()).to_string())
                        .unwrap_or_else(|| "Anonymous".to_string());
                    let _ = writeln!(
                        rows,
                        "  {:<12}  {:<24}  {:<20}  {}",
                        date(inv.timestamp.as_ref()),
                        project,
                        investor,
                        money(inv.amount),
                    );
                }
                let _ = writeln!(rows, "  Total received: {}", money(total));
                rows
            },
        ));
        out
    }
}

pub async fn received(controller: &ResourceController, filter: &ProjectFilter) -> Result<String> {
    require_role(controller, Role::Entrepreneur)?;
    if let ProjectFilter::Project(id) = filter {
        check_id("project", id)?;
    }
    let view = InvestmentsReceived::mount(controller);
    view.select(filter);
    Ok(view.render(filter).await)
}

/// The investor's history.  Each row names the project's creator, looked up
/// through one resource per project and one per creator.
pub async fn history(controller: &ResourceController) -> Result<String> {
    let user = require_role(controller, Role::Investor)?;
    let history = controller.resource::<InvestorHistory>(ids::INVESTOR_HISTORY);
    history.declare(
        api::investor_history(&user.id),
        Dependencies::new().with(&user.id),
    );
    let state = history.settled().await;

    let creators = match state.data() {
        Some(history) => creator_names(controller, history).await,
        None => BTreeMap::new(),
    };

    Ok(section(
        "My Investments",
        &state,
        |h| h.investments.is_empty(),
        "You haven't made any investments yet.",
        |h| {
            let mut rows = String::new();
            for inv in &h.investments {
                let project_id = inv.project.as_ref().map(|p| p.id()).unwrap_or_default();
                let title = inv
                    .project
                    .as_ref()
                    .and_then(|p| p.title())
                    .or_else(|| creators.get(project_id).map(|(title, _)| title.as_str()))
                    .unwrap_or("Unknown project");
                let creator = creators
                    .get(project_id)
                    .map_or("Unknown", |(_, creator)| creator.as_str());
                let _ = writeln!(
                    rows,
                    "  {:<12}  {:<24}  {:<16}  {}",
                    date(inv.timestamp.as_ref()),
                    title,
                    creator,
                    money(inv.amount),
                );
            }
            let _ = writeln!(rows, "  Total invested: {}", money(h.total_invested));
            rows
        },
    ))
}

/// project id → (title, creator name).  Lookups that fail fall back to
/// "Unknown" instead of failing the screen.
async fn creator_names(
    controller: &ResourceController,
    history: &InvestorHistory,
) -> BTreeMap<String, (String, String)> {
    let project_ids: BTreeSet<&str> = history
        .investments
        .iter()
        .filter_map(|inv| inv.project.as_ref().map(|p| p.id()))
        .filter(|id| !id.is_empty())
        .collect();

    // Declare every lookup before awaiting any so they run concurrently.
    let projects: Vec<(&str, Resource<Project>)> = project_ids
        .into_iter()
        .map(|id| {
            let project = controller.resource::<Project>(ids::project(id));
            project.declare(api::project_detail(id), Dependencies::new().with(id));
            (id, project)
        })
        .collect();

    let mut details = Vec::with_capacity(projects.len());
    for (id, project) in &projects {
        if let ViewState::Success(detail) = project.settled().await {
            details.push((id.to_string(), detail));
        }
    }

    let creator_ids: BTreeSet<String> = details
        .iter()
        .filter_map(|(_, p)| p.created_by.as_ref())
        .filter(|c| c.name().is_none())
        .map(|c| c.id().to_string())
        .collect();
    let users: Vec<(String, Resource<UserSummary>)> = creator_ids
        .into_iter()
        .map(|id| {
            let user = controller.resource::<UserSummary>(ids::user(&id));
            user.declare(api::user_detail(&id), Dependencies::new().with(&id));
            (id, user)
        })
        .collect();
    let mut names = BTreeMap::new();
    for (id, user) in &users {
        if let Some(found) = user.settled().await.data() {
            names.insert(id.clone(), found.name.clone());
        }
    }

    details
        .into_iter()
        .map(|(id, project)| {
            let creator = match &project.created_by {
                Some(c) => c
                    .name()
                    .map(String::from)
                    .or_else(|| names.get(c.id()).cloned()),
                None => None,
            };
            (
                id,
                (
                    project.title.clone(),
                    creator.unwrap_or_else(|| "Unknown".to_string()),
                ),
            )
        })
        .collect()
}
