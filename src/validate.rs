use crate::domain::MonthKey;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {field}: '{raw}' is not a number")]
    NotANumber { field: &'static str, raw: String },
    #[error("Invalid {field}: must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("Invalid {field}: must not be negative")]
    Negative { field: &'static str },
    #[error("Invalid {field}: at most two decimal places are allowed")]
    TooPrecise { field: &'static str },
    #[error("Invalid {field}: exceeds the maximum of 1000000000")]
    TooLarge { field: &'static str },
    #[error("{field} is required")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    Date(String),
    #[error("{0}")]
    Month(String),
    #[error("Invalid email address '{0}'")]
    Email(String),
    #[error("Invalid color '{0}'. Expected a hex code like #007bff")]
    Color(String),
    #[error("Invalid currency code '{0}'. Expected three letters like USD")]
    Currency(String),
}

fn parse_decimal(raw: &str, field: &'static str) -> Result<Decimal, ValidationError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .parse::<Decimal>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            raw: raw.to_string(),
        })
}

fn check_money(value: Decimal, field: &'static str) -> Result<Decimal, ValidationError> {
    if value.normalize().scale() > 2 {
        return Err(ValidationError::TooPrecise { field });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::TooLarge { field });
    }
    Ok(value)
}

/// A strictly positive money amount (transactions, targets, contributions).
pub fn amount(raw: &str) -> Result<Decimal, ValidationError> {
    let value = parse_decimal(raw, "amount")?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive { field: "amount" });
    }
    check_money(value, "amount")
}

fn non_negative(raw: &str, field: &'static str) -> Result<Decimal, ValidationError> {
    let value = parse_decimal(raw, field)?;
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field });
    }
    check_money(value, field)
}

/// A budget limit; zero is allowed.
pub fn limit(raw: &str) -> Result<Decimal, ValidationError> {
    non_negative(raw, "limit")
}

/// Monthly or annual income figures; zero is allowed.
pub fn income(raw: &str) -> Result<Decimal, ValidationError> {
    non_negative(raw, "income")
}

fn text(
    raw: &str,
    field: &'static str,
    max: usize,
    required: bool,
) -> Result<String, ValidationError> {
    let value = raw.trim();
    if required && value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value.to_string())
}

pub fn category(raw: &str) -> Result<String, ValidationError> {
    text(raw, "category", 100, true)
}

pub fn description(raw: &str) -> Result<String, ValidationError> {
    text(raw, "description", 255, false)
}

pub fn name(raw: &str) -> Result<String, ValidationError> {
    text(raw, "name", 100, true)
}

pub fn date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    match raw {
        None => Ok(today),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::Date(s.to_string())),
    }
}

pub fn month(raw: &str) -> Result<MonthKey, ValidationError> {
    raw.parse::<MonthKey>().map_err(ValidationError::Month)
}

pub fn email(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim().to_ascii_lowercase();
    let invalid = || ValidationError::Email(raw.to_string());
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || value.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let mut labels = domain.split('.');
    let well_formed = domain.contains('.') && labels.all(|l| !l.is_empty());
    if !well_formed || value.len() > 255 {
        return Err(invalid());
    }
    Ok(value)
}

pub fn color(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    let hex = value
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::Color(raw.to_string()))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::Color(raw.to_string()));
    }
    Ok(value.to_ascii_lowercase())
}

pub fn currency(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::Currency(raw.to_string()));
    }
    Ok(value.to_ascii_uppercase())
}
