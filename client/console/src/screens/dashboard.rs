//! Landing screen, one layout per role.

use std::fmt::Write as _;

use remote_resource::{ResourceController, Role};

use super::{investments, projects, reports, staff};
use crate::api::{AccountUser, Penalties, ProjectFilter, ReportFilter};
use crate::errors::Result;
use crate::render::heading;

fn penalty_alert(penalties: &Penalties) -> String {
    let mut out = heading("Account Restrictions");
    for message in penalties.restriction_messages() {
        let _ = writeln!(out, "  ! {message}");
    }
    if let Some(reason) = penalties.restriction_reason.as_deref().filter(|r| !r.is_empty()) {
        let _ = writeln!(out, "  Reason: {reason}");
    }
    match penalties.restriction_end_date {
        Some(_) => {
            let _ = writeln!(out, "  Restrictions apply until {}.", penalties.until());
        }
        None => out.push_str("  Restrictions apply indefinitely.\n"),
    }
    out
}

pub async fn dashboard(controller: &ResourceController, account: &AccountUser) -> Result<String> {
    let user = &account.identity;
    let mut out = format!("Welcome, {} ({} dashboard)\n", user.name, user.role);

    if let Some(penalties) = account.penalties.as_ref().filter(|p| p.is_active()) {
        out.push_str(&penalty_alert(penalties));
    }

    match user.role {
        Role::Investor => {
            out.push_str(&projects::approved(controller).await);
            out.push_str(&investments::history(controller).await?);
        }
        Role::Entrepreneur => {
            if account.penalties.as_ref().is_some_and(|p| p.is_project_restricted) {
                out.push_str("\nProject creation restricted.\n");
            }
            out.push_str(&projects::own(controller).await?);
            out.push_str(&investments::received(controller, &ProjectFilter::All).await?);
        }
        Role::Staff => {
            out.push_str(&staff::pending_projects(controller).await?);
            out.push_str(&staff::pending_profiles(controller).await?);
            out.push_str(&reports::staff_reports(controller, ReportFilter::All).await?);
        }
    }
    Ok(out)
}
