use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!(
                "Invalid transaction type '{other}'. Expected income or expense"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "medium" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            other => Err(format!(
                "Invalid risk tolerance '{other}'. Expected low, medium or high"
            )),
        }
    }
}

/// Calendar month key rendered as `YYYY-MM`.
///
/// Budgets and reports are keyed by this; a transaction belongs to a month when
/// its date truncated to year-month equals the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current(now: DateTime<Utc>) -> Self {
        Self::of(now.date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    pub fn first_day(&self) -> NaiveDate {
        // Fields only come from `new` or an existing `NaiveDate`.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The month `n` months before this one, or `None` before year 1.
    pub fn minus_months(&self, n: u32) -> Option<Self> {
        let back = i32::try_from(n).ok()?;
        let total = (self.year * 12 + (self.month as i32 - 1)).checked_sub(back)?;
        Self::new(total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (y, m) = raw
            .split_once('-')
            .ok_or_else(|| format!("Invalid month '{raw}'. Expected YYYY-MM"))?;
        if y.len() != 4 || m.len() != 2 {
            return Err(format!("Invalid month '{raw}'. Expected YYYY-MM"));
        }
        let year: i32 = y
            .parse()
            .map_err(|_| format!("Invalid year in month '{raw}'"))?;
        let month: u32 = m
            .parse()
            .map_err(|_| format!("Invalid month number in '{raw}'"))?;
        MonthKey::new(year, month).ok_or_else(|| format!("Month out of range: '{raw}'"))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub default_currency: String,
    pub monthly_income: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub default_currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub annual_income: Option<Decimal>,
    pub financial_goal: Option<String>,
    pub risk_tolerance: RiskTolerance,
    pub currency_preference: String,
    pub notifications_enabled: bool,
    pub dark_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile edit. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub annual_income: Option<Decimal>,
    pub financial_goal: Option<String>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub currency_preference: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub dark_mode: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub transaction_type: TransactionType,
    pub transaction_date: NaiveDate,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub transaction_type: TransactionType,
    pub transaction_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

pub const DEFAULT_TAG_COLOR: &str = "#007bff";

#[derive(Debug, Clone, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub limit_amount: Decimal,
    pub month: MonthKey,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: i64,
    pub category: String,
    pub limit_amount: Decimal,
    pub month: MonthKey,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsGoal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub description: Option<String>,
    pub is_achieved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSavingsGoal {
    pub user_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub description: Option<String>,
}
