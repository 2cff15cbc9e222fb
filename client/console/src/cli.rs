//! Command-line interface.

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::{PenaltyAction, ProjectDecision, ReportFilter, ReportStatus, ReviewStatus};

#[derive(Parser, Debug)]
#[command(name = "venture-console")]
#[command(
    about = "Venture marketplace console for investors, entrepreneurs and staff",
    long_about = None
)]
pub struct Cli {
    /// Account email
    #[arg(long, env = "VENTURE_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(long, env = "VENTURE_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Role-specific overview
    Dashboard,

    /// Approved projects, or one project in detail
    Projects {
        /// Project id
        #[arg(long)]
        id: Option<String>,
    },

    /// Projects you created
    MyProjects,

    /// Invest in an approved project
    Invest {
        /// Project id
        #[arg(long)]
        project: String,

        /// Amount to invest
        #[arg(long)]
        amount: String,
    },

    /// Submit a new project for staff review
    CreateProject {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Funding goal
        #[arg(long)]
        goal: String,

        #[arg(long, value_name = "YYYY-MM-DD")]
        deadline: String,

        /// Image URL
        #[arg(long, default_value = "")]
        img: String,
    },

    /// Wallet balance and transaction history
    Wallet,

    /// Add funds to your wallet
    Deposit { amount: String },

    /// Withdraw funds from your wallet
    Withdraw { amount: String },

    /// Your investments
    History,

    /// Investments received by your projects
    Received {
        /// `all` or a project id
        #[arg(long, default_value = "all")]
        project: String,
    },

    /// Report a user to staff
    Report {
        /// Id of the user being reported
        #[arg(long)]
        user: String,

        #[arg(long)]
        reason: String,

        #[arg(long)]
        details: String,

        /// Related project id
        #[arg(long)]
        project: Option<String>,

        /// Evidence URLs, separated by commas or newlines
        #[arg(long, default_value = "")]
        evidence: String,
    },

    /// Reports you have submitted
    MyReports,

    /// All user reports (staff)
    Reports {
        #[arg(long, value_enum, default_value = "all")]
        status: StatusFilter,
    },

    /// Resolve or dismiss a report (staff)
    ProcessReport {
        /// Report id
        id: String,

        #[arg(long, value_enum)]
        outcome: Outcome,

        /// none, warning, wallet_freeze, project_restriction,
        /// investing_restriction or account_suspension
        #[arg(long, default_value = "none", value_parser = parse_penalty)]
        action: PenaltyAction,

        /// Staff comment, required when resolving
        #[arg(long, default_value = "")]
        comment: String,

        /// Penalty duration in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Lift all penalties from a user (staff)
    RemovePenalties { user: String },

    /// Projects awaiting review (staff)
    PendingProjects,

    /// Approve or reject a pending project (staff)
    ReviewProject {
        /// Project id
        id: String,

        #[arg(long, value_enum)]
        decision: Decision,
    },

    /// Profile updates awaiting review (staff)
    PendingProfiles,

    /// Approve or reject a profile update (staff)
    ReviewProfile {
        /// Update request id
        id: String,

        #[arg(long, value_enum)]
        decision: Decision,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Your entrepreneur profile
    Profile,

    /// Request changes to your entrepreneur profile
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Documents URL
        #[arg(long)]
        documents: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Pending,
    Resolved,
    Dismissed,
}

impl From<StatusFilter> for ReportFilter {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => ReportFilter::All,
            StatusFilter::Pending => ReportFilter::Only(ReportStatus::Pending),
            StatusFilter::Resolved => ReportFilter::Only(ReportStatus::Resolved),
            StatusFilter::Dismissed => ReportFilter::Only(ReportStatus::Dismissed),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Resolved,
    Dismissed,
}

impl From<Outcome> for ReportStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Resolved => ReportStatus::Resolved,
            Outcome::Dismissed => ReportStatus::Dismissed,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for ProjectDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ProjectDecision::Approve,
            Decision::Reject => ProjectDecision::Reject,
        }
    }
}

impl From<Decision> for ReviewStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ReviewStatus::Approved,
            Decision::Reject => ReviewStatus::Rejected,
        }
    }
}

fn parse_penalty(raw: &str) -> Result<PenaltyAction, String> {
    PenaltyAction::parse(raw).ok_or_else(|| format!("unknown penalty action: {raw}"))
}
