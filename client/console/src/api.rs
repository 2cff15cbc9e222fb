//! Marketplace API: endpoints and payload shapes.
//!
//! Shapes follow what the backend actually sends, which is loose in places:
//! references are sometimes a bare id and sometimes a populated document,
//! numbers occasionally arrive as strings, and list fields may be missing or
//! `null`.  The deserializers here absorb that so views only see clean types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use remote_resource::SessionUser;

// ─────────────────────────────────────────────────────────
// Endpoints
// ─────────────────────────────────────────────────────────

pub const LOGIN: &str = "/login";
pub const APPROVED_PROJECTS: &str = "/api/projects/approved";
pub const ENTREPRENEUR_PROJECTS: &str = "/api/entrepreneur-projects";
pub const CREATE_PROJECT: &str = "/create-project";
pub const INVESTMENTS: &str = "/api/investments";
pub const WALLET_BALANCE: &str = "/api/wallet/balance";
pub const WALLET_TRANSACTIONS: &str = "/api/wallet/transactions";
pub const SUBMIT_REPORT: &str = "/api/reports/submit";
pub const MY_REPORTS: &str = "/api/reports/my-reports";
pub const ALL_REPORTS: &str = "/api/reports/all";
pub const PENDING_PROJECTS: &str = "/api/staff/pending-projects";
pub const PENDING_PROFILE_UPDATES: &str = "/profile-updates/pending";

pub fn investor_history(user_id: &str) -> String {
    format!("/api/investments/investor/{user_id}")
}

pub fn received_investments(filter: &ProjectFilter) -> String {
    match filter {
        ProjectFilter::All => "/api/investments/entrepreneur".to_string(),
        ProjectFilter::Project(id) => format!("/api/investments/project/{id}"),
    }
}

pub fn project_detail(project_id: &str) -> String {
    format!("{CREATE_PROJECT}/{project_id}")
}

pub fn user_detail(user_id: &str) -> String {
    format!("/api/users/{user_id}")
}

pub fn wallet_action(action: WalletAction) -> &'static str {
    match action {
        WalletAction::Deposit => "/api/wallet/deposit",
        WalletAction::Withdraw => "/api/wallet/withdraw",
    }
}

pub fn process_report(report_id: &str) -> String {
    format!("/api/reports/{report_id}/process")
}

pub fn remove_penalties(user_id: &str) -> String {
    format!("/api/reports/penalties/remove/{user_id}")
}

pub fn review_project(decision: ProjectDecision, project_id: &str) -> String {
    format!("/api/staff/{}-project/{project_id}", decision.as_str())
}

pub fn review_profile_update(request_id: &str) -> String {
    format!("/profile-updates/{request_id}")
}

pub fn entrepreneur_profile(user_id: &str) -> String {
    format!("/entrepreneur-profile/{user_id}")
}

// ─────────────────────────────────────────────────────────
// Lenient field decoding
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accept `1500`, `"1500"` or `null` (→ 0).
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {s:?}"))),
    }
}

/// A list that may be absent, `null`, or not a list at all (→ empty).
fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose<T> {
        List(Vec<T>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Loose<T>>::deserialize(deserializer)? {
        Some(Loose::List(items)) => items,
        _ => Vec::new(),
    })
}

/// The `message` of a write acknowledgement, or `fallback` when the server
/// sent none (including an empty body).
pub fn ack_message(ack: &serde_json::Value, fallback: &str) -> String {
    ack.get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

// ─────────────────────────────────────────────────────────
// References
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserSummary {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub penalties: Option<Penalties>,
}

/// A user field that is either an id or a populated user document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated(UserSummary),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated(user) => &user.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(user) => Some(user.name.as_str()).filter(|n| !n.is_empty()),
        }
    }

    pub fn summary(&self) -> Option<&UserSummary> {
        match self {
            Self::Id(_) => None,
            Self::Populated(user) => Some(user),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Id(String),
    Populated(ProjectSummary),
}

impl ProjectRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated(project) => &project.id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(project) => Some(project.title.as_str()),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The `user` object returned by `/login`: identity plus any active penalties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountUser {
    #[serde(flatten)]
    pub identity: SessionUser,
    #[serde(default)]
    pub penalties: Option<Penalties>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: AccountUser,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalties {
    #[serde(default)]
    pub is_wallet_frozen: bool,
    #[serde(default)]
    pub is_project_restricted: bool,
    #[serde(default)]
    pub is_investing_restricted: bool,
    #[serde(default)]
    pub restriction_reason: Option<String>,
    #[serde(default)]
    pub restriction_end_date: Option<DateTime<Utc>>,
}

impl Penalties {
    pub fn is_active(&self) -> bool {
        self.is_wallet_frozen || self.is_project_restricted || self.is_investing_restricted
    }

    /// Sentences explaining each active restriction to the penalised user.
    pub fn restriction_messages(&self) -> Vec<&'static str> {
        let mut messages = Vec::new();
        if self.is_wallet_frozen {
            messages.push(
                "Your wallet is currently frozen and you cannot make deposits or withdrawals.",
            );
        }
        if self.is_project_restricted {
            messages.push("Your ability to create or modify projects has been restricted.");
        }
        if self.is_investing_restricted {
            messages.push("Your ability to make investments has been restricted.");
        }
        messages
    }

    /// Short labels for staff views.
    pub fn labels(&self) -> String {
        let labels: Vec<&str> = [
            (self.is_wallet_frozen, "Wallet Frozen"),
            (self.is_project_restricted, "Project Restricted"),
            (self.is_investing_restricted, "Investing Restricted"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();

        if labels.is_empty() {
            "No active penalties".to_string()
        } else {
            labels.join(", ")
        }
    }

    pub fn until(&self) -> String {
        match self.restriction_end_date {
            Some(date) => date.format("%B %d, %Y").to_string(),
            None => "indefinitely".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrepreneurProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub documents: Option<String>,
    #[serde(default)]
    pub pending_update: Option<ProfileChanges>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_info.is_none()
            && self.image.is_none()
            && self.documents.is_none()
    }

    /// `field: value` pairs for display.
    pub fn describe(&self) -> Vec<(&'static str, &str)> {
        [
            ("Name", self.name.as_deref()),
            ("Contact", self.contact_info.as_deref()),
            ("Image", self.image.as_deref()),
            ("Documents", self.documents.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<UserRef>,
    #[serde(default)]
    pub requested_changes: Option<ProfileChanges>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReview {
    pub status: ReviewStatus,
    pub review_notes: String,
}

// ─────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub funding_goal: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_investment: f64,
    #[serde(default)]
    pub remaining_goal: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserRef>,
}

impl Project {
    /// Funding progress in percent; `0` when the goal is not positive.
    pub fn progress_percent(&self) -> f64 {
        if self.funding_goal > 0.0 {
            self.current_investment / self.funding_goal * 100.0
        } else {
            0.0
        }
    }

    pub fn remaining(&self) -> f64 {
        self.remaining_goal
            .unwrap_or_else(|| (self.funding_goal - self.current_investment).max(0.0))
    }
}

/// Which of an entrepreneur's projects to list investments for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectFilter {
    All,
    Project(String),
}

impl ProjectFilter {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => Self::All,
            id => Self::Project(id.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Project(id) => id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub funding_goal: f64,
    pub deadline: NaiveDate,
    pub img: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProject {
    #[serde(default)]
    pub inserted_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectDecision {
    Approve,
    Reject,
}

impl ProjectDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

// ─────────────────────────────────────────────────────────
// Investments
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Investment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "projectId", default)]
    pub project: Option<ProjectRef>,
    #[serde(rename = "investorId", default)]
    pub investor: Option<UserRef>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `{ investments: [...] }` as returned for an entrepreneur.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReceivedInvestments {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub investments: Vec<Investment>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorHistory {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub investments: Vec<Investment>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_invested: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
    pub project_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReceipt {
    #[serde(default)]
    pub updated_balance: Option<f64>,
}

// ─────────────────────────────────────────────────────────
// Wallet
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WalletBalance {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletAction {
    Deposit,
    Withdraw,
}

impl fmt::Display for WalletAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdrawal",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletAmount {
    pub amount: f64,
}

// ─────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFilter {
    All,
    Only(ReportStatus),
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => report.status == *status,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub details: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub reported_by: Option<UserRef>,
    #[serde(default)]
    pub reported_user: Option<UserRef>,
    #[serde(default)]
    pub related_project_id: Option<ProjectRef>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub evidence_urls: Vec<String>,
    #[serde(default)]
    pub admin_comments: Option<String>,
    #[serde(default)]
    pub action_taken: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    pub reported_user_id: String,
    pub reason: String,
    pub details: String,
    pub related_project_id: Option<String>,
    pub evidence_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyAction {
    None,
    Warning,
    WalletFreeze,
    ProjectRestriction,
    InvestingRestriction,
    AccountSuspension,
}

impl PenaltyAction {
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw.trim() {
            "none" => Self::None,
            "warning" => Self::Warning,
            "wallet_freeze" => Self::WalletFreeze,
            "project_restriction" => Self::ProjectRestriction,
            "investing_restriction" => Self::InvestingRestriction,
            "account_suspension" => Self::AccountSuspension,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDecision {
    pub status: ReportStatus,
    pub action_taken: PenaltyAction,
    pub admin_comments: String,
    pub penalty_duration: u32,
}
