//! Client-side input checks.  The backend stays authoritative; these only
//! catch what can be rejected without a round trip.

use chrono::NaiveDate;

use crate::api::{
    NewProject, PenaltyAction, ReportDecision, ReportStatus, ReportSubmission, WalletAction,
};
use crate::errors::{ConsoleError, Result};

/// Parse a user-entered amount: finite and strictly positive.
pub fn parse_amount(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(ConsoleError::validation("Please enter a valid amount")),
    }
}

pub fn check_investment(amount: f64, balance: f64) -> Result<()> {
    if amount > balance {
        return Err(ConsoleError::validation("Insufficient wallet balance"));
    }
    Ok(())
}

pub fn check_wallet_action(action: WalletAction, amount: f64, balance: f64) -> Result<()> {
    match action {
        WalletAction::Deposit => Ok(()),
        WalletAction::Withdraw if amount > balance => Err(ConsoleError::validation(
            "Insufficient balance for withdrawal",
        )),
        WalletAction::Withdraw => Ok(()),
    }
}

/// Ids are interpolated into paths, so keep them to a safe alphabet.
pub fn check_id<'a>(what: &str, raw: &'a str) -> Result<&'a str> {
    let id = raw.trim();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(ConsoleError::validation(format!("Invalid {what} id: {raw:?}")))
    }
}

/// Split free-form evidence input on newlines and commas, dropping blanks.
pub fn parse_evidence_urls(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}

pub fn build_report(
    reported_user_id: &str,
    reason: &str,
    details: &str,
    related_project_id: Option<&str>,
    evidence: &str,
) -> Result<ReportSubmission> {
    let reason = reason.trim();
    let details = details.trim();
    if reason.is_empty() || details.is_empty() {
        return Err(ConsoleError::validation(
            "Please provide a reason and details for the report",
        ));
    }

    let related_project_id = related_project_id
        .map(|id| check_id("project", id).map(String::from))
        .transpose()?;

    Ok(ReportSubmission {
        reported_user_id: check_id("user", reported_user_id)?.to_string(),
        reason: reason.to_string(),
        details: details.to_string(),
        related_project_id,
        evidence_urls: parse_evidence_urls(evidence),
    })
}

/// Staff decision on a report.  Resolving needs a comment; dismissing never
/// carries a penalty.
pub fn build_report_decision(
    status: ReportStatus,
    action: PenaltyAction,
    comment: &str,
    penalty_days: u32,
) -> Result<ReportDecision> {
    let comment = comment.trim();
    let action_taken = match status {
        ReportStatus::Pending => {
            return Err(ConsoleError::validation(
                "A report can only be resolved or dismissed",
            ))
        }
        ReportStatus::Resolved if comment.is_empty() => {
            return Err(ConsoleError::validation(
                "Please add a comment when resolving a report",
            ))
        }
        ReportStatus::Resolved => action,
        ReportStatus::Dismissed => PenaltyAction::None,
    };

    Ok(ReportDecision {
        status,
        action_taken,
        admin_comments: comment.to_string(),
        penalty_duration: penalty_days,
    })
}

pub fn build_project(
    title: &str,
    description: &str,
    funding_goal: &str,
    deadline: &str,
    img: &str,
) -> Result<NewProject> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(ConsoleError::validation(
            "A project needs a title and a description",
        ));
    }
    let funding_goal = parse_amount(funding_goal)
        .map_err(|_| ConsoleError::validation("Funding goal must be a positive number"))?;
    let deadline = NaiveDate::parse_from_str(deadline.trim(), "%Y-%m-%d")
        .map_err(|_| ConsoleError::validation("Deadline must be a date (YYYY-MM-DD)"))?;

    Ok(NewProject {
        title: title.to_string(),
        description: description.to_string(),
        funding_goal,
        deadline,
        img: img.trim().to_string(),
    })
}
