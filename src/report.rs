use crate::domain::{MonthKey, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Monthly income/expense roll-up for one user.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub month: MonthKey,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub category_expenses: HashMap<String, Decimal>,
    pub category_income: HashMap<String, Decimal>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// Percent of the partition total; 0 when that total is 0.
    pub percentage: Decimal,
}

/// Builds the report for `month`, or `None` when no transaction falls in it.
///
/// `None` is distinct from a report whose totals happen to be zero.
pub fn generate_report(transactions: &[Transaction], month: MonthKey) -> Option<ReportData> {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut category_expenses: HashMap<String, Decimal> = HashMap::new();
    let mut category_income: HashMap<String, Decimal> = HashMap::new();
    let mut transaction_count = 0usize;

    for t in transactions.iter().filter(|t| month.contains(t.transaction_date)) {
        transaction_count += 1;
        let (total, by_category) = match t.transaction_type {
            TransactionType::Income => (&mut total_income, &mut category_income),
            TransactionType::Expense => (&mut total_expenses, &mut category_expenses),
        };
        *total += t.amount;
        *by_category
            .entry(t.category.clone())
            .or_insert(Decimal::ZERO) += t.amount;
    }

    if transaction_count == 0 {
        return None;
    }

    Some(ReportData {
        month,
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
        category_expenses,
        category_income,
        transaction_count,
    })
}

impl ReportData {
    pub fn expense_breakdown(&self) -> Vec<CategoryShare> {
        breakdown(&self.category_expenses, self.total_expenses)
    }

    pub fn income_breakdown(&self) -> Vec<CategoryShare> {
        breakdown(&self.category_income, self.total_income)
    }
}

/// Largest amount first; equal amounts by category name.
fn breakdown(by_category: &HashMap<String, Decimal>, total: Decimal) -> Vec<CategoryShare> {
    let mut out: Vec<CategoryShare> = by_category
        .iter()
        .map(|(category, amount)| CategoryShare {
            category: category.clone(),
            amount: *amount,
            percentage: share_of(*amount, total),
        })
        .collect();
    out.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}

fn share_of(amount: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    amount / total * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("decimal")
    }

    fn month(s: &str) -> MonthKey {
        s.parse().expect("month")
    }

    fn tx(kind: TransactionType, amount: &str, category: &str, date: &str) -> Transaction {
        Transaction {
            id: 0,
            user_id: 1,
            amount: dec(amount),
            description: String::new(),
            category: category.to_string(),
            transaction_type: kind,
            transaction_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date"),
            tags: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn salary_groceries_dining_month() {
        let txs = vec![
            tx(TransactionType::Income, "3000", "Salary", "2024-03-01"),
            tx(TransactionType::Expense, "100", "Dining", "2024-03-09"),
            tx(TransactionType::Expense, "200", "Groceries", "2024-03-12"),
        ];

        let report = generate_report(&txs, month("2024-03")).expect("report");
        assert_eq!(report.total_income, dec("3000"));
        assert_eq!(report.total_expenses, dec("300"));
        assert_eq!(report.net_income, dec("2700"));
        assert_eq!(report.transaction_count, 3);

        let expenses = report.expense_breakdown();
        let names: Vec<&str> = expenses.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Groceries", "Dining"]);
        assert_eq!(expenses[0].percentage.round_dp(1), dec("66.7"));
        assert_eq!(expenses[1].percentage.round_dp(1), dec("33.3"));

        let income = report.income_breakdown();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].percentage, dec("100"));
    }

    #[test]
    fn month_without_transactions_has_no_report() {
        let txs = vec![tx(TransactionType::Income, "3000", "Salary", "2024-02-29")];
        assert!(generate_report(&txs, month("2024-03")).is_none());
        assert!(generate_report(&[], month("2024-03")).is_none());
    }

    #[test]
    fn zero_net_income_is_still_a_report() {
        let txs = vec![
            tx(TransactionType::Income, "50", "Refund", "2024-03-01"),
            tx(TransactionType::Expense, "50", "Dining", "2024-03-02"),
        ];
        let report = generate_report(&txs, month("2024-03")).expect("report");
        assert_eq!(report.net_income, Decimal::ZERO);
    }

    #[test]
    fn expenses_only_month_has_negative_net_and_empty_income() {
        let txs = vec![tx(TransactionType::Expense, "42.10", "Gas", "2024-03-03")];
        let report = generate_report(&txs, month("2024-03")).expect("report");
        assert_eq!(report.net_income, dec("-42.10"));
        assert!(report.income_breakdown().is_empty());
        assert!(report.category_income.is_empty());
    }

    #[test]
    fn category_sums_match_partition_totals() {
        let txs = vec![
            tx(TransactionType::Income, "1200.50", "Salary", "2024-03-01"),
            tx(TransactionType::Income, "99.50", "Freelance", "2024-03-02"),
            tx(TransactionType::Income, "0.75", "Salary", "2024-03-15"),
            tx(TransactionType::Expense, "10.10", "Coffee", "2024-03-03"),
            tx(TransactionType::Expense, "33.33", "Gas", "2024-03-04"),
            tx(TransactionType::Expense, "66.67", "Coffee", "2024-03-05"),
        ];
        let report = generate_report(&txs, month("2024-03")).expect("report");

        let expense_sum: Decimal = report.category_expenses.values().copied().sum();
        let income_sum: Decimal = report.category_income.values().copied().sum();
        assert_eq!(expense_sum, report.total_expenses);
        assert_eq!(income_sum, report.total_income);
        assert_eq!(
            report.net_income,
            report.total_income - report.total_expenses
        );
        assert_eq!(report.category_income["Salary"], dec("1201.25"));
    }

    #[test]
    fn equal_amounts_sort_by_category_name() {
        let txs = vec![
            tx(TransactionType::Expense, "40", "Phone", "2024-03-01"),
            tx(TransactionType::Expense, "40", "Gym", "2024-03-01"),
            tx(TransactionType::Expense, "90", "Utilities", "2024-03-01"),
            tx(TransactionType::Expense, "40", "Internet", "2024-03-01"),
        ];
        let report = generate_report(&txs, month("2024-03")).expect("report");
        let names: Vec<String> = report
            .expense_breakdown()
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, vec!["Utilities", "Gym", "Internet", "Phone"]);
    }
}
