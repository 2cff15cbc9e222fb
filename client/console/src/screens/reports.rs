//! Reporting users, and staff moderation of reports.

use std::fmt::Write as _;

use remote_resource::{Dependencies, MutationRequest, Resource, ResourceController, Role};
use serde_json::Value;
use tracing::info;

use super::{ids, require_role, signed_in};
use crate::api::{self, ack_message, Report, ReportDecision, ReportFilter, ReportSubmission, UserRef};
use crate::errors::Result;
use crate::render::{capitalize, date, section};
use crate::validation::check_id;

fn user_label(user: Option<&UserRef>) -> String {
    match user {
        Some(UserRef::Populated(u)) if !u.email.is_empty() => format!("{} ({})", u.name, u.email),
        Some(UserRef::Populated(u)) => u.name.clone(),
        Some(UserRef::Id(id)) => id.clone(),
        None => "Unknown".to_string(),
    }
}

fn report_rows(reports: &[&Report], staff: bool) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(
            out,
            "  [{}] {}  {}  {}",
            report.id,
            capitalize(report.status.as_str()),
            date(report.created_at.as_ref()),
            report.reason,
        );
        let _ = writeln!(
            out,
            "      Reported user: {}",
            user_label(report.reported_user.as_ref())
        );
        if staff {
            let _ = writeln!(
                out,
                "      Reported by: {}",
                user_label(report.reported_by.as_ref())
            );
            if let Some(penalties) = report
                .reported_user
                .as_ref()
                .and_then(UserRef::summary)
                .and_then(|u| u.penalties.as_ref())
            {
                let _ = writeln!(out, "      Penalties: {}", penalties.labels());
            }
        }
        let _ = writeln!(out, "      {}", report.details);
        if let Some(project) = &report.related_project_id {
            let _ = writeln!(
                out,
                "      Related project: {}",
                project.title().unwrap_or(project.id())
            );
        }
        for url in &report.evidence_urls {
            let _ = writeln!(out, "      Evidence: {url}");
        }
        if let Some(action) = report.action_taken.as_deref().filter(|a| *a != "none") {
            let _ = writeln!(out, "      Action taken: {action}");
        }
        if let Some(comments) = report.admin_comments.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "      Staff comments: {comments}");
        }
    }
    out
}

pub async fn submit(controller: &ResourceController, report: ReportSubmission) -> Result<String> {
    signed_in(controller)?;
    let request = MutationRequest::post(api::SUBMIT_REPORT).json(&report)?;
    let ack: Value = controller
        .mutate(request, &[ids::MY_REPORTS.into(), ids::ALL_REPORTS.into()])
        .await?;
    info!(reported_user = %report.reported_user_id, "report submitted");
    Ok(format!(
        "{}\n",
        ack_message(&ack, "Report submitted successfully")
    ))
}

/// Reports the signed-in user has filed.
pub async fn mine(controller: &ResourceController) -> Result<String> {
    signed_in(controller)?;
    let reports = controller.resource::<Vec<Report>>(ids::MY_REPORTS);
    reports.declare(api::MY_REPORTS, Dependencies::none());
    Ok(section(
        "My Reports",
        &reports.settled().await,
        |r| r.is_empty(),
        "You haven't submitted any reports.",
        |r| report_rows(&r.iter().collect::<Vec<_>>(), false),
    ))
}

/// All reports for staff.  The status filter is applied locally; the list is
/// fetched once.
pub struct StaffReports {
    reports: Resource<Vec<Report>>,
}

impl StaffReports {
    pub fn mount(controller: &ResourceController) -> Self {
        let reports = controller.resource::<Vec<Report>>(ids::ALL_REPORTS);
        reports.declare(api::ALL_REPORTS, Dependencies::none());
        StaffReports { reports }
    }

    pub async fn render(&self, filter: ReportFilter) -> String {
        let state = self.reports.settled().await;
        let title = format!("User Reports ({})", filter.key());
        section(
            &title,
            &state,
            |r| !r.iter().any(|report| filter.matches(report)),
            "No reports found.",
            |r| {
                let shown: Vec<&Report> = r.iter().filter(|rep| filter.matches(rep)).collect();
                report_rows(&shown, true)
            },
        )
    }
}

pub async fn staff_reports(controller: &ResourceController, filter: ReportFilter) -> Result<String> {
    require_role(controller, Role::Staff)?;
    Ok(StaffReports::mount(controller).render(filter).await)
}

pub async fn process(
    controller: &ResourceController,
    report_id: &str,
    decision: ReportDecision,
) -> Result<String> {
    require_role(controller, Role::Staff)?;
    let report_id = check_id("report", report_id)?;

    let view = StaffReports::mount(controller);
    let request = MutationRequest::put(api::process_report(report_id)).json(&decision)?;
    let ack: Value = controller
        .mutate(request, &[ids::ALL_REPORTS.into()])
        .await?;
    info!(report_id, status = decision.status.as_str(), "report processed");

    Ok(format!(
        "{}\n{}",
        ack_message(&ack, "Report processed successfully"),
        view.render(ReportFilter::All).await
    ))
}

pub async fn remove_penalties(controller: &ResourceController, user_id: &str) -> Result<String> {
    require_role(controller, Role::Staff)?;
    let user_id = check_id("user", user_id)?;

    let request = MutationRequest::put(api::remove_penalties(user_id));
    let ack: Value = controller
        .mutate(request, &[ids::ALL_REPORTS.into()])
        .await?;
    info!(user_id, "penalties removed");
    Ok(format!(
        "{}\n",
        ack_message(&ack, "Penalties removed successfully")
    ))
}
