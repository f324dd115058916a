use crate::db::{Scope, Upsert};
use crate::domain::{
    MonthKey, NewBudget, NewSavingsGoal, NewTag, NewTransaction, TransactionType, User,
};
use crate::tags::resolve_tags;
use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::info;

const SAMPLE_TAGS: &[(&str, &str, &str)] = &[
    ("work", "Work-related expenses", "#007bff"),
    ("food", "Food and dining", "#28a745"),
    ("transport", "Transportation costs", "#ffc107"),
    ("entertainment", "Entertainment and leisure", "#e83e8c"),
    ("health", "Healthcare expenses", "#20c997"),
    ("education", "Educational expenses", "#6f42c1"),
    ("shopping", "Shopping and retail", "#fd7e14"),
    ("utilities", "Utility bills", "#6c757d"),
    ("rent", "Housing and rent", "#dc3545"),
    ("investment", "Investment related", "#17a2b8"),
    ("recurring", "Recurring transactions", "#343a40"),
    ("one-time", "One-time expenses", "#f8f9fa"),
];

const SAMPLE_BUDGETS: &[(&str, i64)] = &[
    ("Groceries", 400),
    ("Dining", 200),
    ("Entertainment", 150),
    ("Shopping", 300),
    ("Transportation", 200),
    ("Health", 250),
    ("Utilities", 200),
];

const SAMPLE_GOALS: &[(&str, i64, &str)] = &[
    ("Emergency Fund", 10_000, "Six months of expenses"),
    ("Vacation", 3_000, "Summer trip"),
    ("New Car", 15_000, "Down payment for a car"),
];

struct Entry {
    day: u32,
    category: &'static str,
    description: &'static str,
    kind: TransactionType,
    amounts: &'static [i64],
    tags: &'static [&'static str],
}

const SCHEDULE: &[Entry] = &[
    Entry {
        day: 1,
        category: "Salary",
        description: "Monthly salary",
        kind: TransactionType::Income,
        amounts: &[4500],
        tags: &["work", "recurring"],
    },
    Entry {
        day: 1,
        category: "Rent",
        description: "Apartment rent",
        kind: TransactionType::Expense,
        amounts: &[1200],
        tags: &["rent", "recurring"],
    },
    Entry {
        day: 4,
        category: "Groceries",
        description: "Weekly groceries",
        kind: TransactionType::Expense,
        amounts: &[150, 200, 250],
        tags: &["food"],
    },
    Entry {
        day: 9,
        category: "Transportation",
        description: "Transit pass",
        kind: TransactionType::Expense,
        amounts: &[50, 80],
        tags: &["transport", "recurring"],
    },
    Entry {
        day: 12,
        category: "Utilities",
        description: "Electricity and water",
        kind: TransactionType::Expense,
        amounts: &[120, 150, 180],
        tags: &["utilities", "recurring"],
    },
    Entry {
        day: 15,
        category: "Freelance",
        description: "Side project",
        kind: TransactionType::Income,
        amounts: &[500, 800, 1200],
        tags: &["work", "one-time"],
    },
    Entry {
        day: 18,
        category: "Groceries",
        description: "Weekly groceries",
        kind: TransactionType::Expense,
        amounts: &[200, 150],
        tags: &["food"],
    },
    Entry {
        day: 21,
        category: "Dining",
        description: "Dinner out",
        kind: TransactionType::Expense,
        amounts: &[50, 75, 100],
        tags: &["food", "entertainment"],
    },
    Entry {
        day: 25,
        category: "Entertainment",
        description: "Concert tickets",
        kind: TransactionType::Expense,
        amounts: &[80, 20, 50],
        tags: &["entertainment", "one-time"],
    },
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub tags_created: usize,
    pub budgets_created: usize,
    pub goals_created: usize,
    pub transactions_created: usize,
}

/// Sample transactions for one month; `index` varies the amounts between months.
fn planned_transactions(
    user_id: i64,
    month: MonthKey,
    index: usize,
) -> Vec<(NewTransaction, &'static [&'static str])> {
    let first = month.first_day();
    SCHEDULE
        .iter()
        .map(|e| {
            let date: NaiveDate = first.with_day(e.day).unwrap_or(first);
            let amount = Decimal::from(e.amounts[index % e.amounts.len()]);
            (
                NewTransaction {
                    user_id,
                    amount,
                    description: e.description.to_string(),
                    category: e.category.to_string(),
                    transaction_type: e.kind,
                    transaction_date: date,
                },
                e.tags,
            )
        })
        .collect()
}

fn month_back(current: MonthKey, offset: u32) -> Result<MonthKey> {
    current
        .minus_months(offset)
        .ok_or_else(|| anyhow!("Cannot seed {offset} months before {current}"))
}

/// Tags, budgets and goals are only created when missing; transactions are
/// appended for each of the last `months` months ending at `current`.
pub fn seed(scope: &Scope<'_>, user: &User, current: MonthKey, months: u32) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for (name, description, color) in SAMPLE_TAGS {
        if scope.find_tag_by_name(name)?.is_none() {
            scope.insert_tag(&NewTag {
                name: name.to_string(),
                description: Some(description.to_string()),
                color: color.to_string(),
            })?;
            summary.tags_created += 1;
        }
    }

    for offset in 0..months {
        let month = month_back(current, offset)?;
        for (category, limit) in SAMPLE_BUDGETS {
            if scope.find_budget(user.id, category, month)?.is_some() {
                continue;
            }
            let (_, outcome) = scope.upsert_budget(&NewBudget {
                user_id: user.id,
                category: category.to_string(),
                limit_amount: Decimal::from(*limit),
                month,
                description: None,
            })?;
            if outcome == Upsert::Created {
                summary.budgets_created += 1;
            }
        }
    }

    for (name, target, description) in SAMPLE_GOALS {
        if scope.find_goal(user.id, name)?.is_none() {
            scope.insert_goal(&NewSavingsGoal {
                user_id: user.id,
                name: name.to_string(),
                target_amount: Decimal::from(*target),
                description: Some(description.to_string()),
            })?;
            summary.goals_created += 1;
        }
    }

    for offset in (0..months).rev() {
        let month = month_back(current, offset)?;
        let index = (months - 1 - offset) as usize;
        for (tx, tag_names) in planned_transactions(user.id, month, index) {
            let requested: Vec<String> = tag_names.iter().map(|t| t.to_string()).collect();
            let tags = resolve_tags(&requested, |name| scope.find_tag_by_name(name))?;
            scope.insert_transaction(&tx, &tags.ids())?;
            summary.transactions_created += 1;
        }
    }

    info!(
        user_id = user.id,
        tags = summary.tags_created,
        budgets = summary.budgets_created,
        goals = summary.goals_created,
        transactions = summary.transactions_created,
        "seeded sample data"
    );
    Ok(summary)
}
