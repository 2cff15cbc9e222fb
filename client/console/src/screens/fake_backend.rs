//! In-memory marketplace answering the console's requests in tests.

use std::sync::{Arc, Mutex, PoisonError};

use remote_resource::testing::ScriptedTransport;
use remote_resource::{
    ApiRequest, ApiResponse, Method, ResourceController, Role, Session, SessionUser,
};
use serde_json::{json, Value};

pub struct Market {
    pub balance: f64,
    pub transactions: Vec<Value>,
    pub approved: Vec<Value>,
    pub pending: Vec<Value>,
    pub investments: Vec<Value>,
    pub reports: Vec<Value>,
    pub profile_updates: Vec<Value>,
    pub profile: Value,
    /// Paths answered with a 500 instead of their usual body.
    pub broken: Vec<&'static str>,
}

impl Default for Market {
    fn default() -> Self {
        Market {
            balance: 500.0,
            transactions: vec![json!({
                "_id": "t1", "type": "deposit", "amount": 500,
                "description": "Initial deposit", "createdAt": "2024-01-05T09:00:00Z"
            })],
            approved: vec![
                json!({
                    "_id": "p1", "title": "Solar Roofs", "description": "Panels for schools",
                    "fundingGoal": 20000, "currentInvestment": 5000, "createdBy": "u9"
                }),
                json!({
                    "_id": "p2", "title": "Clean Water", "description": "Village wells",
                    "fundingGoal": "8000", "currentInvestment": 0,
                    "createdBy": { "_id": "u8", "name": "Musa", "email": "musa@example.com" }
                }),
            ],
            pending: vec![json!({
                "_id": "p3", "title": "Vertical Farm", "description": "Rooftop greens",
                "fundingGoal": 12000, "currentInvestment": 0, "status": "pending"
            })],
            investments: vec![json!({
                "_id": "i1", "amount": 250, "timestamp": "2024-02-01T10:00:00Z",
                "projectId": "p1", "investorId": "u1"
            })],
            reports: vec![
                json!({
                    "_id": "r1", "reason": "Fraud", "details": "Fake invoices", "status": "pending",
                    "reportedBy": { "_id": "u1", "name": "Ada", "email": "ada@example.com" },
                    "reportedUser": {
                        "_id": "u9", "name": "Grace", "email": "grace@example.com",
                        "penalties": { "isWalletFrozen": true }
                    },
                    "createdAt": "2024-02-10T08:00:00Z"
                }),
                json!({
                    "_id": "r2", "reason": "Spam", "details": "Repeated messages",
                    "status": "dismissed", "reportedUser": "u7",
                    "adminComments": "Not actionable"
                }),
            ],
            profile_updates: vec![json!({
                "_id": "pu1", "status": "pending",
                "userId": { "_id": "u9", "name": "Grace", "email": "grace@example.com" },
                "requestedChanges": { "contactInfo": "+1 555 0100" }
            })],
            profile: json!({
                "name": "Ada", "email": "ada@example.com", "contactInfo": "ada@example.com"
            }),
            broken: Vec::new(),
        }
    }
}

pub fn user(role: Role) -> SessionUser {
    SessionUser {
        id: "u1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        role,
    }
}

pub struct Fixture {
    pub controller: ResourceController,
    pub transport: Arc<ScriptedTransport>,
    pub market: Arc<Mutex<Market>>,
}

impl Fixture {
    pub fn new(role: Role) -> Self {
        Self::with_market(role, Market::default())
    }

    pub fn with_market(role: Role, market: Market) -> Self {
        Self::build(Session::signed_in(user(role)), market)
    }

    pub fn anonymous() -> Self {
        Self::build(Session::Anonymous, Market::default())
    }

    fn build(session: Session, market: Market) -> Self {
        let market = Arc::new(Mutex::new(market));
        let state = Arc::clone(&market);
        let transport = ScriptedTransport::auto(move |request| {
            let mut market = state.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(route(&mut market, request))
        });
        let controller = ResourceController::new(transport.clone(), session);
        Fixture {
            controller,
            transport,
            market,
        }
    }

    pub fn market(&self) -> std::sync::MutexGuard<'_, Market> {
        self.market.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Paths requested so far, in order.
    pub fn paths(&self) -> Vec<String> {
        self.transport
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method.as_str(), r.path))
            .collect()
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::json(&body)
}

fn status(code: u16, message: &str) -> ApiResponse {
    ApiResponse::with_status(code, &json!({ "message": message }))
}

fn amount(request: &ApiRequest) -> f64 {
    request
        .body
        .as_ref()
        .and_then(|b| b["amount"].as_f64())
        .unwrap_or(0.0)
}

fn route(market: &mut Market, request: &ApiRequest) -> ApiResponse {
    let path = request.path.as_str();
    if market.broken.iter().any(|broken| *broken == path) {
        return status(500, "Internal server error");
    }
    let body = request.body.clone().unwrap_or(Value::Null);

    match (request.method, path) {
        (Method::Get, "/api/projects/approved") => ok(json!(market.approved)),
        (Method::Get, "/api/entrepreneur-projects") => ok(json!(market.approved)),
        (Method::Get, "/api/staff/pending-projects") => ok(json!(market.pending)),
        (Method::Get, "/api/wallet/balance") => ok(json!({ "balance": market.balance })),
        (Method::Get, "/api/wallet/transactions") => ok(json!(market.transactions)),
        (Method::Get, "/api/reports/all") => ok(json!(market.reports)),
        (Method::Get, "/api/reports/my-reports") => {
            let mine: Vec<&Value> = market
                .reports
                .iter()
                .filter(|r| r["reportedBy"]["_id"] == "u1")
                .collect();
            ok(json!(mine))
        }
        (Method::Get, "/profile-updates/pending") => ok(json!(market.profile_updates)),
        (Method::Get, "/api/investments/entrepreneur") => {
            ok(json!({ "investments": market.investments }))
        }
        (Method::Get, "/api/investments/investor/u1") => {
            let total: f64 = market
                .investments
                .iter()
                .filter_map(|i| i["amount"].as_f64())
                .sum();
            ok(json!({ "investments": market.investments, "totalInvested": total }))
        }
        (Method::Get, p) if p.starts_with("/api/investments/project/") => {
            let id = &p["/api/investments/project/".len()..];
            let matching: Vec<&Value> = market
                .investments
                .iter()
                .filter(|i| i["projectId"] == id)
                .collect();
            ok(json!({ "investments": matching }))
        }
        (Method::Get, p) if p.starts_with("/create-project/") => {
            let id = &p["/create-project/".len()..];
            match market.approved.iter().find(|p| p["_id"] == id) {
                Some(project) => ok(project.clone()),
                None => status(404, "Project not found"),
            }
        }
        (Method::Get, "/api/users/u9") => {
            ok(json!({ "_id": "u9", "name": "Grace", "email": "grace@example.com" }))
        }
        (Method::Get, p) if p.starts_with("/api/users/") => status(404, "User not found"),
        (Method::Get, "/entrepreneur-profile/u1") => ok(market.profile.clone()),

        (Method::Post, "/login") => {
            let role = match body["email"].as_str() {
                Some("ada@example.com") => "investor",
                Some("grace@example.com") => "entrepreneur",
                Some("sam@example.com") => "staff",
                _ => return status(401, "Invalid credentials"),
            };
            if body["password"] != "hunter2" {
                return status(401, "Invalid credentials");
            }
            ok(json!({
                "user": {
                    "_id": "u1", "name": "Ada", "email": body["email"], "role": role,
                    "penalties": { "isWalletFrozen": role == "entrepreneur" }
                }
            }))
        }
        (Method::Post, "/api/wallet/deposit") => {
            market.balance += amount(request);
            market.transactions.push(json!({
                "_id": format!("t{}", market.transactions.len() + 1),
                "type": "deposit", "amount": amount(request), "description": "Deposit"
            }));
            ok(json!({ "balance": market.balance }))
        }
        (Method::Post, "/api/wallet/withdraw") => {
            if amount(request) > market.balance {
                return status(400, "Insufficient balance");
            }
            market.balance -= amount(request);
            market.transactions.push(json!({
                "_id": format!("t{}", market.transactions.len() + 1),
                "type": "withdrawal", "amount": amount(request), "description": "Withdrawal"
            }));
            ok(json!({ "balance": market.balance }))
        }
        (Method::Post, "/api/investments") => {
            let invested = amount(request);
            let project_id = body["projectId"].clone();
            let Some(project) = market.approved.iter_mut().find(|p| p["_id"] == project_id)
            else {
                return status(404, "Project not found");
            };
            let current = project["currentInvestment"].as_f64().unwrap_or(0.0);
            project["currentInvestment"] = json!(current + invested);
            market.balance -= invested;
            market.investments.push(json!({
                "_id": format!("i{}", market.investments.len() + 1),
                "amount": invested, "projectId": project_id, "investorId": "u1"
            }));
            ok(json!({ "message": "Investment successful", "updatedBalance": market.balance }))
        }
        (Method::Post, "/create-project") => {
            let mut project = body;
            project["_id"] = json!("p-new");
            project["status"] = json!("pending");
            market.pending.push(project);
            ok(json!({ "insertedId": "p-new" }))
        }
        (Method::Post, "/api/reports/submit") => {
            let mut report = body;
            report["_id"] = json!(format!("r{}", market.reports.len() + 1));
            report["status"] = json!("pending");
            report["reportedBy"] = json!({ "_id": "u1", "name": "Ada" });
            market.reports.push(report);
            ok(json!({ "message": "Report submitted successfully" }))
        }

        (Method::Put, p) if p.starts_with("/api/reports/penalties/remove/") => {
            ok(json!({ "message": "Penalties removed successfully" }))
        }
        (Method::Put, p) if p.starts_with("/api/reports/") && p.ends_with("/process") => {
            let id = &p["/api/reports/".len()..p.len() - "/process".len()];
            match market.reports.iter_mut().find(|r| r["_id"] == id) {
                Some(report) => {
                    report["status"] = body["status"].clone();
                    report["adminComments"] = body["adminComments"].clone();
                    report["actionTaken"] = body["actionTaken"].clone();
                    ok(json!({ "message": "Report processed successfully" }))
                }
                None => status(404, "Report not found"),
            }
        }
        (Method::Put, "/entrepreneur-profile/u1") => {
            market.profile["pendingUpdate"] = body;
            ok(json!({ "message": "Update request submitted" }))
        }

        (Method::Patch, p) if p.starts_with("/api/staff/") => {
            let (decision, id) = p["/api/staff/".len()..]
                .split_once("-project/")
                .unwrap_or(("", ""));
            let Some(index) = market.pending.iter().position(|p| p["_id"] == id) else {
                return status(404, "Project not found");
            };
            let mut project = market.pending.remove(index);
            if decision == "approve" {
                project["status"] = json!("approved");
                market.approved.push(project);
            }
            let outcome = if decision == "approve" { "approved" } else { "rejected" };
            ok(json!({ "message": format!("Project {outcome}") }))
        }
        (Method::Patch, p) if p.starts_with("/profile-updates/") => {
            let id = &p["/profile-updates/".len()..];
            market.profile_updates.retain(|u| u["_id"] != id);
            ok(Value::Null)
        }

        _ => status(404, "Not found"),
    }
}
