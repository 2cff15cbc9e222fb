//! Staff review queues: pending projects and profile updates.

use std::fmt::Write as _;

use remote_resource::{Dependencies, MutationRequest, ResourceController, Role};
use serde_json::Value;
use tracing::info;

use super::projects::project_rows;
use super::{ids, require_role};
use crate::api::{
    self, ack_message, Project, ProfileReview, ProfileUpdateRequest, ProjectDecision, ReviewStatus,
    UserRef,
};
use crate::errors::Result;
use crate::render::section;
use crate::validation::check_id;

pub async fn pending_projects(controller: &ResourceController) -> Result<String> {
    require_role(controller, Role::Staff)?;
    let projects = controller.resource::<Vec<Project>>(ids::PENDING_PROJECTS);
    projects.declare(api::PENDING_PROJECTS, Dependencies::none());
    Ok(section(
        "Projects Awaiting Review",
        &projects.settled().await,
        |p| p.is_empty(),
        "No projects are waiting for review.",
        |p| project_rows(p),
    ))
}

pub async fn review_project(
    controller: &ResourceController,
    decision: ProjectDecision,
    project_id: &str,
) -> Result<String> {
    require_role(controller, Role::Staff)?;
    let project_id = check_id("project", project_id)?;

    let request = MutationRequest::patch(api::review_project(decision, project_id));
    let ack: Value = controller
        .mutate(
            request,
            &[ids::PENDING_PROJECTS.into(), ids::APPROVED_PROJECTS.into()],
        )
        .await?;
    info!(project_id, decision = decision.as_str(), "project reviewed");

    let fallback = match decision {
        ProjectDecision::Approve => "Project approved",
        ProjectDecision::Reject => "Project rejected",
    };
    Ok(format!(
        "{}\n{}",
        ack_message(&ack, fallback),
        pending_projects(controller).await?
    ))
}

fn profile_rows(requests: &[ProfileUpdateRequest]) -> String {
    let mut out = String::new();
    for request in requests {
        let who = match &request.user_id {
            Some(UserRef::Populated(u)) => format!("{} ({})", u.name, u.email),
            Some(UserRef::Id(id)) => id.clone(),
            None => "Unknown user".to_string(),
        };
        let _ = writeln!(out, "  [{}] {who}", request.id);
        match &request.requested_changes {
            Some(changes) if !changes.is_empty() => {
                for (field, value) in changes.describe() {
                    let _ = writeln!(out, "      {field}: {value}");
                }
            }
            _ => out.push_str("      (no changes listed)\n"),
        }
    }
    out
}

pub async fn pending_profiles(controller: &ResourceController) -> Result<String> {
    require_role(controller, Role::Staff)?;
    let requests = controller.resource::<Vec<ProfileUpdateRequest>>(ids::PENDING_PROFILES);
    requests.declare(api::PENDING_PROFILE_UPDATES, Dependencies::none());
    Ok(section(
        "Profile Updates Awaiting Review",
        &requests.settled().await,
        |r| r.is_empty(),
        "No profile updates are waiting for review.",
        |r| profile_rows(r),
    ))
}

pub async fn review_profile(
    controller: &ResourceController,
    request_id: &str,
    status: ReviewStatus,
    notes: &str,
) -> Result<String> {
    require_role(controller, Role::Staff)?;
    let request_id = check_id("profile update", request_id)?;

    let review = ProfileReview {
        status,
        review_notes: notes.trim().to_string(),
    };
    let request = MutationRequest::patch(api::review_profile_update(request_id)).json(&review)?;
    let ack: Value = controller
        .mutate(request, &[ids::PENDING_PROFILES.into()])
        .await?;
    info!(request_id, ?status, "profile update reviewed");

    let fallback = match status {
        ReviewStatus::Approved => "Profile update approved",
        ReviewStatus::Rejected => "Profile update rejected",
    };
    Ok(format!(
        "{}\n{}",
        ack_message(&ack, fallback),
        pending_profiles(controller).await?
    ))
}
