use crate::domain::{Budget, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    pub spent: Decimal,
    pub remaining: Decimal,
    pub over_budget: bool,
}

/// Spending against one budget.
///
/// Only expenses in the budget's category whose date falls in the budget's month
/// count. Ownership is not checked here; callers pass the owning user's transactions.
pub fn compute_budget_status(budget: &Budget, transactions: &[Transaction]) -> BudgetStatus {
    let mut spent = Decimal::ZERO;
    for t in transactions {
        match t.transaction_type {
            TransactionType::Income => continue,
            TransactionType::Expense => {}
        }
        if t.category != budget.category {
            continue;
        }
        if !budget.month.contains(t.transaction_date) {
            continue;
        }
        spent += t.amount;
    }

    let remaining = budget.limit_amount - spent;
    BudgetStatus {
        spent,
        remaining,
        over_budget: remaining < Decimal::ZERO,
    }
}

/// Share of the limit already spent, in percent. Not capped; a zero limit reads as 0.
pub fn usage_percentage(budget: &Budget, status: &BudgetStatus) -> Decimal {
    if budget.limit_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    status.spent / budget.limit_amount * Decimal::ONE_HUNDRED
}
