//! Wallet balance, transaction history, deposits and withdrawals.

use std::fmt::Write as _;

use remote_resource::{Dependencies, MutationRequest, Resource, ResourceController};
use tracing::info;

use super::{ids, load, signed_in};
use crate::api::{self, Transaction, WalletAction, WalletAmount, WalletBalance};
use crate::errors::Result;
use crate::render::{capitalize, date, money, section};
use crate::validation::{check_wallet_action, parse_amount};

/// Balance and history, mounted together.
pub struct WalletView {
    balance: Resource<WalletBalance>,
    transactions: Resource<Vec<Transaction>>,
}

impl WalletView {
    pub fn mount(controller: &ResourceController) -> Self {
        let balance = controller.resource::<WalletBalance>(ids::WALLET_BALANCE);
        balance.declare(api::WALLET_BALANCE, Dependencies::none());
        let transactions = controller.resource::<Vec<Transaction>>(ids::WALLET_TRANSACTIONS);
        transactions.declare(api::WALLET_TRANSACTIONS, Dependencies::none());
        WalletView {
            balance,
            transactions,
        }
    }

    pub async fn render(&self) -> String {
        let (balance, transactions) =
            tokio::join!(self.balance.settled(), self.transactions.settled());

        let mut out = section(
            "Wallet",
            &balance,
            |_| false,
            "",
            |b| format!("  Balance: {}\n", money(b.balance)),
        );
        out.push_str(&section(
            "Transaction History",
            &transactions,
            |t| t.is_empty(),
            "No transactions yet.",
            |t| transaction_rows(t),
        ));
        out
    }
}

fn transaction_rows(transactions: &[Transaction]) -> String {
    let mut out = String::new();
    for tx in transactions {
        let sign = if tx.kind == "deposit" { "+" } else { "-" };
        let _ = writeln!(
            out,
            "  {:<12}  {:<12}  {sign}{:<12}  {}",
            date(tx.created_at.as_ref()),
            capitalize(&tx.kind),
            money(tx.amount),
            tx.description,
        );
    }
    out
}

pub async fn show(controller: &ResourceController) -> Result<String> {
    signed_in(controller)?;
    Ok(WalletView::mount(controller).render().await)
}

/// Deposit or withdraw.  The returned balance is written straight into the
/// balance resource; the transaction list is re-fetched.
pub async fn transact(
    controller: &ResourceController,
    action: WalletAction,
    raw_amount: &str,
) -> Result<String> {
    signed_in(controller)?;
    let amount = parse_amount(raw_amount)?;

    let view = WalletView::mount(controller);
    check_wallet_action(action, amount, load(&view.balance).await?.balance)?;

    let request = MutationRequest::post(api::wallet_action(action)).json(&WalletAmount { amount })?;
    let updated: WalletBalance = controller
        .mutate(request, &[ids::WALLET_TRANSACTIONS.into()])
        .await?;
    view.balance.replace_data(updated);
    info!(%action, amount, balance = updated.balance, "wallet updated");

    Ok(format!("{action} successful!\n{}", view.render().await))
}
