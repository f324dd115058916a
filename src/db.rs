use crate::config::{AppPaths, now_utc};
use crate::domain::{
    Budget, MonthKey, NewBudget, NewSavingsGoal, NewTag, NewTransaction, NewUser, ProfileUpdate,
    RiskTolerance, SavingsGoal, Tag, Transaction, TransactionType, User, UserProfile,
};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

pub struct Db {
    conn: Connection,
}

/// One unit of work against the store. Created by [`Db::scope`].
pub struct Scope<'c> {
    tx: rusqlite::Transaction<'c>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedUser {
    pub transactions: usize,
    pub budgets: usize,
    pub savings_goals: usize,
    pub profile: bool,
}

const USER_COLS: &str = "id, name, email, default_currency, monthly_income, created_at";
const PROFILE_COLS: &str = "id, user_id, phone_number, address, occupation, annual_income, \
     financial_goal, risk_tolerance, currency_preference, notifications_enabled, dark_mode, \
     created_at, updated_at";
const TRANSACTION_COLS: &str =
    "id, user_id, amount, description, category, transaction_type, transaction_date, created_at";
const TAG_COLS: &str = "id, name, description, color, created_at";
const BUDGET_COLS: &str =
    "id, user_id, category, limit_amount, month, description, created_at, updated_at";
const GOAL_COLS: &str = "id, user_id, name, target_amount, current_amount, description, \
     is_achieved, created_at, updated_at";

impl Db {
    pub fn open(paths: &AppPaths) -> Result<(Self, PathBuf)> {
        fs::create_dir_all(&paths.data_dir)
            .with_context(|| format!("Failed to create data dir {}", paths.data_dir.display()))?;

        let db_path = paths.db_path();
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open DB {}", db_path.display()))?;

        let db = Self { conn };
        db.migrate()?;
        debug!(path = %db_path.display(), "database ready");
        Ok((db, db_path))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                default_currency TEXT NOT NULL DEFAULT 'USD',
                monthly_income TEXT NOT NULL DEFAULT '0',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL UNIQUE REFERENCES users(id),
                phone_number TEXT,
                address TEXT,
                occupation TEXT,
                annual_income TEXT,
                financial_goal TEXT,
                risk_tolerance TEXT NOT NULL DEFAULT 'medium',
                currency_preference TEXT NOT NULL DEFAULT 'USD',
                notifications_enabled INTEGER NOT NULL DEFAULT 1,
                dark_mode INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                transaction_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user_date
                ON transactions(user_id, transaction_date);

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                color TEXT NOT NULL DEFAULT '#007bff',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transaction_tags (
                transaction_id INTEGER NOT NULL REFERENCES transactions(id),
                tag_id INTEGER NOT NULL REFERENCES tags(id),
                PRIMARY KEY (transaction_id, tag_id)
            );

            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                category TEXT NOT NULL,
                limit_amount TEXT NOT NULL,
                month TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, category, month)
            );

            CREATE TABLE IF NOT EXISTS savings_goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                name TEXT NOT NULL,
                target_amount TEXT NOT NULL,
                current_amount TEXT NOT NULL DEFAULT '0',
                description TEXT,
                is_achieved INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, name)
            );
            "#,
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    /// Runs `op` inside a single SQLite transaction.
    ///
    /// Commits when `op` returns `Ok`; otherwise rolls everything back and returns
    /// the original error. Dropping the transaction on panic also rolls back.
    pub fn scope<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&Scope<'_>) -> Result<T>,
    {
        let scope = Scope {
            tx: self
                .conn
                .transaction()
                .context("Failed to begin transaction")?,
        };

        match op(&scope) {
            Ok(value) => {
                scope.tx.commit().context("Failed to commit transaction")?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                debug!(error = %err, "scope rolled back");
                Err(err)
            }
        }
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse::<Decimal>().map_err(|e| conversion_error(idx, e))
}

fn opt_decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| r.parse::<Decimal>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

fn parsed_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| conversion_error(idx, e.to_string()))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        default_currency: row.get(3)?,
        monthly_income: decimal_at(row, 4)?,
        created_at: timestamp_at(row, 5)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        phone_number: row.get(2)?,
        address: row.get(3)?,
        occupation: row.get(4)?,
        annual_income: opt_decimal_at(row, 5)?,
        financial_goal: row.get(6)?,
        risk_tolerance: parsed_at::<RiskTolerance>(row, 7)?,
        currency_preference: row.get(8)?,
        notifications_enabled: row.get(9)?,
        dark_mode: row.get(10)?,
        created_at: timestamp_at(row, 11)?,
        updated_at: timestamp_at(row, 12)?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: decimal_at(row, 2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        transaction_type: parsed_at::<TransactionType>(row, 5)?,
        transaction_date: date_at(row, 6)?,
        tags: Vec::new(),
        created_at: timestamp_at(row, 7)?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        created_at: timestamp_at(row, 4)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        limit_amount: decimal_at(row, 3)?,
        month: parsed_at::<MonthKey>(row, 4)?,
        description: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: decimal_at(row, 3)?,
        current_amount: decimal_at(row, 4)?,
        description: row.get(5)?,
        is_achieved: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
    })
}

impl Scope<'_> {
    // --- users -----------------------------------------------------------

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .tx
            .query_row(
                &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .tx
            .query_row(
                &format!("SELECT {USER_COLS} FROM users WHERE email = ?1"),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn insert_user(&self, new: &NewUser) -> Result<User> {
        self.tx
            .execute(
                "INSERT INTO users (name, email, default_currency, monthly_income, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.name,
                    new.email,
                    new.default_currency,
                    Decimal::ZERO.to_string(),
                    now_utc().to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to create user {}", new.email))?;
        let id = self.tx.last_insert_rowid();
        debug!(user_id = id, "inserted user");
        self.get_user(id)?
            .context("Inserted user vanished before it could be read back")
    }

    pub fn update_user_settings(
        &self,
        user_id: i64,
        default_currency: Option<&str>,
        monthly_income: Option<Decimal>,
    ) -> Result<User> {
        if let Some(currency) = default_currency {
            self.tx.execute(
                "UPDATE users SET default_currency = ?1 WHERE id = ?2",
                params![currency, user_id],
            )?;
        }
        if let Some(income) = monthly_income {
            self.tx.execute(
                "UPDATE users SET monthly_income = ?1 WHERE id = ?2",
                params![income.to_string(), user_id],
            )?;
        }
        self.get_user(user_id)?
            .with_context(|| format!("No user with id {user_id}"))
    }

    /// Deletes the user and everything it owns, children first.
    pub fn delete_user(&self, user_id: i64) -> Result<DeletedUser> {
        self.tx.execute(
            "DELETE FROM transaction_tags WHERE transaction_id IN \
             (SELECT id FROM transactions WHERE user_id = ?1)",
            params![user_id],
        )?;
        let transactions = self
            .tx
            .execute("DELETE FROM transactions WHERE user_id = ?1", params![user_id])?;
        let budgets = self
            .tx
            .execute("DELETE FROM budgets WHERE user_id = ?1", params![user_id])?;
        let savings_goals = self
            .tx
            .execute("DELETE FROM savings_goals WHERE user_id = ?1", params![user_id])?;
        let profile = self
            .tx
            .execute("DELETE FROM user_profiles WHERE user_id = ?1", params![user_id])?;
        self.tx
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

        debug!(user_id, transactions, budgets, savings_goals, "deleted user");
        Ok(DeletedUser {
            transactions,
            budgets,
            savings_goals,
            profile: profile > 0,
        })
    }

    // --- profiles --------------------------------------------------------

    pub fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let profile = self
            .tx
            .query_row(
                &format!("SELECT {PROFILE_COLS} FROM user_profiles WHERE user_id = ?1"),
                params![user_id],
                profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// Creates the profile, or applies only the provided fields to the existing one.
    pub fn upsert_profile(
        &self,
        user: &User,
        update: &ProfileUpdate,
    ) -> Result<(UserProfile, Upsert)> {
        let now = now_utc().to_rfc3339();
        let existing = self.find_profile(user.id)?;

        let outcome = match existing {
            Some(mut p) => {
                if let Some(v) = &update.phone_number {
                    p.phone_number = Some(v.clone());
                }
                if let Some(v) = &update.address {
                    p.address = Some(v.clone());
                }
                if let Some(v) = &update.occupation {
                    p.occupation = Some(v.clone());
                }
                if let Some(v) = update.annual_income {
                    p.annual_income = Some(v);
                }
                if let Some(v) = &update.financial_goal {
                    p.financial_goal = Some(v.clone());
                }
                if let Some(v) = update.risk_tolerance {
                    p.risk_tolerance = v;
                }
                if let Some(v) = &update.currency_preference {
                    p.currency_preference = v.clone();
                }
                if let Some(v) = update.notifications_enabled {
                    p.notifications_enabled = v;
                }
                if let Some(v) = update.dark_mode {
                    p.dark_mode = v;
                }

                self.tx.execute(
                    "UPDATE user_profiles SET phone_number = ?1, address = ?2, occupation = ?3, \
                     annual_income = ?4, financial_goal = ?5, risk_tolerance = ?6, \
                     currency_preference = ?7, notifications_enabled = ?8, dark_mode = ?9, \
                     updated_at = ?10 WHERE id = ?11",
                    params![
                        p.phone_number,
                        p.address,
                        p.occupation,
                        p.annual_income.map(|d| d.to_string()),
                        p.financial_goal,
                        p.risk_tolerance.as_str(),
                        p.currency_preference,
                        p.notifications_enabled,
                        p.dark_mode,
                        now,
                        p.id,
                    ],
                )?;
                Upsert::Updated
            }
            None => {
                self.tx.execute(
                    "INSERT INTO user_profiles (user_id, phone_number, address, occupation, \
                     annual_income, financial_goal, risk_tolerance, currency_preference, \
                     notifications_enabled, dark_mode, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                    params![
                        user.id,
                        update.phone_number,
                        update.address,
                        update.occupation,
                        update.annual_income.map(|d| d.to_string()),
                        update.financial_goal,
                        update.risk_tolerance.unwrap_or_default().as_str(),
                        update
                            .currency_preference
                            .clone()
                            .unwrap_or_else(|| user.default_currency.clone()),
                        update.notifications_enabled.unwrap_or(true),
                        update.dark_mode.unwrap_or(false),
                        now,
                    ],
                )?;
                Upsert::Created
            }
        };

        let profile = self
            .find_profile(user.id)?
            .context("Profile vanished after write")?;
        Ok((profile, outcome))
    }

    // --- transactions ----------------------------------------------------

    /// Inserts the transaction and links `tag_ids`; repeated ids link once.
    pub fn insert_transaction(&self, new: &NewTransaction, tag_ids: &[i64]) -> Result<Transaction> {
        self.tx.execute(
            "INSERT INTO transactions (user_id, amount, description, category, \
             transaction_type, transaction_date, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.user_id,
                new.amount.to_string(),
                new.description,
                new.category,
                new.transaction_type.as_str(),
                new.transaction_date.format("%Y-%m-%d").to_string(),
                now_utc().to_rfc3339(),
            ],
        )?;
        let id = self.tx.last_insert_rowid();

        for tag_id in tag_ids {
            self.tx.execute(
                "INSERT OR IGNORE INTO transaction_tags (transaction_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )?;
        }
        debug!(transaction_id = id, tags = tag_ids.len(), "inserted transaction");

        let mut tx = self
            .tx
            .query_row(
                &format!("SELECT {TRANSACTION_COLS} FROM transactions WHERE id = ?1"),
                params![id],
                transaction_from_row,
            )
            .context("Failed to read back inserted transaction")?;
        tx.tags = self.tag_names_for_transaction(id)?;
        Ok(tx)
    }

    /// Most recent first (by date, then insertion order).
    pub fn list_transactions(&self, user_id: i64, limit: usize) -> Result<Vec<Transaction>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.load_transactions(
            &format!(
                "SELECT {TRANSACTION_COLS} FROM transactions WHERE user_id = ?1 \
                 ORDER BY transaction_date DESC, id DESC LIMIT ?2"
            ),
            params![user_id, limit],
        )
    }

    pub fn transactions_in_month(&self, user_id: i64, month: MonthKey) -> Result<Vec<Transaction>> {
        self.load_transactions(
            &format!(
                "SELECT {TRANSACTION_COLS} FROM transactions \
                 WHERE user_id = ?1 AND transaction_date LIKE ?2 \
                 ORDER BY transaction_date ASC, id ASC"
            ),
            params![user_id, format!("{month}-%")],
        )
    }

    fn load_transactions(
        &self,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<Transaction>> {
        let mut stmt = self.tx.prepare(sql)?;
        let rows = stmt.query_map(args, transaction_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            let mut t = row.context("Invalid transaction row")?;
            t.tags = self.tag_names_for_transaction(t.id)?;
            out.push(t);
        }
        Ok(out)
    }

    fn tag_names_for_transaction(&self, transaction_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.tx.prepare(
            "SELECT t.name FROM transaction_tags tt JOIN tags t ON t.id = tt.tag_id \
             WHERE tt.transaction_id = ?1 ORDER BY t.name ASC",
        )?;
        let names = stmt
            .query_map(params![transaction_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    // --- tags ------------------------------------------------------------

    pub fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .tx
            .query_row(
                &format!("SELECT {TAG_COLS} FROM tags WHERE name = ?1"),
                params![name],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    pub fn insert_tag(&self, new: &NewTag) -> Result<Tag> {
        self.tx
            .execute(
                "INSERT INTO tags (name, description, color, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![new.name, new.description, new.color, now_utc().to_rfc3339()],
            )
            .with_context(|| format!("Failed to create tag '{}'", new.name))?;
        self.find_tag_by_name(&new.name)?
            .context("Inserted tag vanished before it could be read back")
    }

    /// All tags by name, each with the number of transactions carrying it.
    pub fn list_tags(&self) -> Result<Vec<(Tag, usize)>> {
        let mut stmt = self.tx.prepare(
            "SELECT t.id, t.name, t.description, t.color, t.created_at, COUNT(tt.transaction_id) \
             FROM tags t LEFT JOIN transaction_tags tt ON tt.tag_id = t.id \
             GROUP BY t.id ORDER BY t.name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let tag = tag_from_row(row)?;
            let count: i64 = row.get(5)?;
            Ok((tag, count))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (tag, count) = row?;
            out.push((tag, usize::try_from(count).unwrap_or(0)));
        }
        Ok(out)
    }

    // --- budgets ---------------------------------------------------------

    pub fn find_budget(
        &self,
        user_id: i64,
        category: &str,
        month: MonthKey,
    ) -> Result<Option<Budget>> {
        let budget = self
            .tx
            .query_row(
                &format!(
                    "SELECT {BUDGET_COLS} FROM budgets \
                     WHERE user_id = ?1 AND category = ?2 AND month = ?3"
                ),
                params![user_id, category, month.to_string()],
                budget_from_row,
            )
            .optional()?;
        Ok(budget)
    }

    /// One budget per (user, category, month): re-adding replaces the limit.
    pub fn upsert_budget(&self, new: &NewBudget) -> Result<(Budget, Upsert)> {
        let now = now_utc().to_rfc3339();
        let outcome = match self.find_budget(new.user_id, &new.category, new.month)? {
            Some(existing) => {
                self.tx.execute(
                    "UPDATE budgets SET limit_amount = ?1, \
                     description = COALESCE(?2, description), updated_at = ?3 WHERE id = ?4",
                    params![new.limit_amount.to_string(), new.description, now, existing.id],
                )?;
                Upsert::Updated
            }
            None => {
                self.tx.execute(
                    "INSERT INTO budgets (user_id, category, limit_amount, month, description, \
                     created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    params![
                        new.user_id,
                        new.category,
                        new.limit_amount.to_string(),
                        new.month.to_string(),
                        new.description,
                        now,
                    ],
                )?;
                Upsert::Created
            }
        };

        let budget = self
            .find_budget(new.user_id, &new.category, new.month)?
            .context("Budget vanished after write")?;
        Ok((budget, outcome))
    }

    pub fn budgets_for_month(&self, user_id: i64, month: MonthKey) -> Result<Vec<Budget>> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {BUDGET_COLS} FROM budgets WHERE user_id = ?1 AND month = ?2 \
             ORDER BY category ASC"
        ))?;
        let budgets = stmt
            .query_map(params![user_id, month.to_string()], budget_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Invalid budget row")?;
        Ok(budgets)
    }

    // --- savings goals ---------------------------------------------------

    pub fn insert_goal(&self, new: &NewSavingsGoal) -> Result<SavingsGoal> {
        let now = now_utc().to_rfc3339();
        self.tx
            .execute(
                "INSERT INTO savings_goals (user_id, name, target_amount, current_amount, \
                 description, is_achieved, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
                params![
                    new.user_id,
                    new.name,
                    new.target_amount.to_string(),
                    Decimal::ZERO.to_string(),
                    new.description,
                    now,
                ],
            )
            .with_context(|| format!("Failed to create savings goal '{}'", new.name))?;
        self.find_goal(new.user_id, &new.name)?
            .context("Inserted savings goal vanished before it could be read back")
    }

    pub fn find_goal(&self, user_id: i64, name: &str) -> Result<Option<SavingsGoal>> {
        let goal = self
            .tx
            .query_row(
                &format!("SELECT {GOAL_COLS} FROM savings_goals WHERE user_id = ?1 AND name = ?2"),
                params![user_id, name],
                goal_from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// Persists accumulated amount and achieved flag.
    pub fn update_goal(&self, goal: &SavingsGoal) -> Result<()> {
        let changed = self.tx.execute(
            "UPDATE savings_goals SET current_amount = ?1, is_achieved = ?2, updated_at = ?3 \
             WHERE id = ?4",
            params![
                goal.current_amount.to_string(),
                goal.is_achieved,
                now_utc().to_rfc3339(),
                goal.id,
            ],
        )?;
        if changed == 0 {
            anyhow::bail!("Savings goal '{}' no longer exists", goal.name);
        }
        Ok(())
    }

    pub fn list_goals(&self, user_id: i64) -> Result<Vec<SavingsGoal>> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {GOAL_COLS} FROM savings_goals WHERE user_id = ?1 \
             ORDER BY created_at ASC, id ASC"
        ))?;
        let goals = stmt
            .query_map(params![user_id], goal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Invalid savings goal row")?;
        Ok(goals)
    }
}
