mod budget;
mod cli;
mod config;
mod db;
mod domain;
mod error;
mod goals;
mod render;
mod report;
mod seed;
mod tags;
mod validate;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::budget::{compute_budget_status, usage_percentage};
use crate::cli::{
    BudgetCmd, Cli, Command, GoalCmd, ListFormat, ProfileCmd, ProfileFields, ReportFormat, TagCmd,
    TxCmd, UserCmd,
};
use crate::config::{AppConfig, app_paths, load_or_init_config, now_utc, write_config};
use crate::db::{Db, Upsert};
use crate::domain::{
    DEFAULT_TAG_COLOR, MonthKey, NewBudget, NewSavingsGoal, NewTag, NewTransaction, NewUser,
    ProfileUpdate, TransactionType, User, UserProfile,
};
use crate::error::TrackerError;
use crate::goals::{GoalProgress, add_contribution};
use crate::render::{
    format_currency, format_percentage, print_panel, print_table, print_tsv, progress_bar,
};
use crate::report::{CategoryShare, ReportData, generate_report};
use crate::tags::resolve_tags;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FINTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// The logged-in user, resolved once per command.
struct Session {
    user: User,
}

fn require_session(db: &mut Db, cfg: &AppConfig) -> Result<Session> {
    let Some(user_id) = cfg.current_user_id else {
        return Err(TrackerError::NotLoggedIn.into());
    };
    match db.scope(|s| s.get_user(user_id))? {
        Some(user) => Ok(Session { user }),
        None => {
            debug!(user_id, "configured user no longer exists");
            Err(TrackerError::NotLoggedIn.into())
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;
    let (mut db, db_path) = Db::open(&paths)?;
    debug!(db = %db_path.display(), config = %cfg_path.display(), "opened store");

    match cli.command {
        Command::Login(args) => handle_login(&mut db, &args.name, &args.email, &mut cfg, &cfg_path),
        Command::Logout => handle_logout(&mut cfg, &cfg_path),
        Command::User(args) => {
            let session = require_session(&mut db, &cfg)?;
            handle_user(&mut db, &session, args.cmd, &mut cfg, &cfg_path)
        }
        Command::Profile(args) => {
            let session = require_session(&mut db, &cfg)?;
            handle_profile(&mut db, &session, args.cmd)
        }
        Command::Tx(args) => {
            let session = require_session(&mut db, &cfg)?;
            handle_tx(&mut db, &session, &cfg, args.cmd)
        }
        Command::Budget(args) => {
            let session = require_session(&mut db, &cfg)?;
            handle_budget(&mut db, &session, args.cmd)
        }
        Command::Goal(args) => {
            let session = require_session(&mut db, &cfg)?;
            handle_goal(&mut db, &session, &cfg, args.cmd)
        }
        Command::Report(args) => {
            let session = require_session(&mut db, &cfg)?;
            handle_report(&mut db, &session, args.month.as_deref(), args.format)
        }
        Command::Tag(args) => handle_tag(&mut db, args.cmd),
        Command::Seed(args) => {
            let session = require_session(&mut db, &cfg)?;
            let summary = db.scope(|s| {
                seed::seed(s, &session.user, MonthKey::current(now_utc()), args.months)
            })?;
            println!(
                "Seeded {} tags, {} budgets, {} savings goals and {} transactions.",
                summary.tags_created,
                summary.budgets_created,
                summary.goals_created,
                summary.transactions_created
            );
            Ok(())
        }
    }
}

fn resolve_month(raw: Option<&str>) -> Result<MonthKey> {
    match raw {
        Some(m) => Ok(validate::month(m)?),
        None => Ok(MonthKey::current(now_utc())),
    }
}

fn handle_login(
    db: &mut Db,
    name: &str,
    email: &str,
    cfg: &mut AppConfig,
    cfg_path: &Path,
) -> Result<()> {
    let name = validate::name(name)?;
    let email = validate::email(email)?;

    let (user, created) = db.scope(|s| match s.find_user_by_email(&email)? {
        Some(user) => Ok((user, false)),
        None => {
            let user = s.insert_user(&NewUser {
                name: name.clone(),
                email: email.clone(),
                default_currency: cfg.default_currency.clone(),
            })?;
            Ok((user, true))
        }
    })?;

    cfg.current_user_id = Some(user.id);
    write_config(cfg_path, cfg)?;
    info!(user_id = user.id, created, "logged in");

    if created {
        println!("Created new user: {} ({})", user.name, user.email);
    } else {
        println!("Welcome back, {}!", user.name);
    }
    Ok(())
}

fn handle_logout(cfg: &mut AppConfig, cfg_path: &Path) -> Result<()> {
    if cfg.current_user_id.take().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    write_config(cfg_path, cfg)?;
    println!("Logged out.");
    Ok(())
}

fn handle_user(
    db: &mut Db,
    session: &Session,
    cmd: UserCmd,
    cfg: &mut AppConfig,
    cfg_path: &Path,
) -> Result<()> {
    let user = &session.user;
    match cmd {
        UserCmd::Show => {
            let profile = db.scope(|s| s.find_profile(user.id))?;
            print_panel(
                "User",
                &[
                    ("Name", user.name.clone()),
                    ("Email", user.email.clone()),
                    ("Currency", user.default_currency.clone()),
                    ("Monthly income", format_currency(user.monthly_income)),
                    ("Member since", user.created_at.format("%Y-%m-%d").to_string()),
                ],
            );
            match profile {
                Some(p) => print_profile(&p),
                None => println!("(no profile)"),
            }
            Ok(())
        }
        UserCmd::Set {
            currency,
            monthly_income,
        } => {
            if currency.is_none() && monthly_income.is_none() {
                return Err(anyhow!(
                    "Nothing to update. Pass --currency and/or --monthly-income"
                ));
            }
            let currency = currency.as_deref().map(validate::currency).transpose()?;
            let income = monthly_income
                .as_deref()
                .map(validate::income)
                .transpose()?;

            let updated =
                db.scope(|s| s.update_user_settings(user.id, currency.as_deref(), income))?;
            println!(
                "Updated {}: currency {}, monthly income {}",
                updated.name,
                updated.default_currency,
                format_currency(updated.monthly_income)
            );
            Ok(())
        }
        UserCmd::Delete { yes } => {
            if !yes {
                let prompt = format!(
                    "Delete user '{}' and all of their data? [y/N] ",
                    user.email
                );
                if !prompt_yes_no(&prompt, false)? {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = db
                .scope(|s| s.delete_user(user.id))
                .with_context(|| format!("Failed to delete user {}", user.email))?;
            cfg.current_user_id = None;
            write_config(cfg_path, cfg)?;
            info!(user_id = user.id, profile = deleted.profile, "deleted user");

            println!(
                "Deleted user {} ({} transactions, {} budgets, {} savings goals).",
                user.email, deleted.transactions, deleted.budgets, deleted.savings_goals
            );
            Ok(())
        }
    }
}

fn print_profile(p: &UserProfile) {
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    print_panel(
        "Profile",
        &[
            ("Phone", or_dash(&p.phone_number)),
            ("Address", or_dash(&p.address)),
            ("Occupation", or_dash(&p.occupation)),
            (
                "Annual income",
                p.annual_income
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Financial goal", or_dash(&p.financial_goal)),
            ("Risk tolerance", p.risk_tolerance.to_string()),
            ("Currency", p.currency_preference.clone()),
            ("Notifications", on_off(p.notifications_enabled)),
            ("Dark mode", on_off(p.dark_mode)),
        ],
    );
}

fn on_off(flag: bool) -> String {
    let label = if flag { "on" } else { "off" };
    label.to_string()
}

fn profile_update(fields: ProfileFields) -> Result<ProfileUpdate> {
    let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
    Ok(ProfileUpdate {
        phone_number: trimmed(fields.phone),
        address: trimmed(fields.address),
        occupation: trimmed(fields.occupation),
        annual_income: fields
            .annual_income
            .as_deref()
            .map(validate::income)
            .transpose()?,
        financial_goal: trimmed(fields.financial_goal),
        risk_tolerance: fields.risk_tolerance,
        currency_preference: fields
            .currency
            .as_deref()
            .map(validate::currency)
            .transpose()?,
        notifications_enabled: fields.notifications,
        dark_mode: fields.dark_mode,
    })
}

fn handle_profile(db: &mut Db, session: &Session, cmd: ProfileCmd) -> Result<()> {
    let user = &session.user;
    match cmd {
        ProfileCmd::Set(fields) => {
            let update = profile_update(fields)?;
            let (profile, outcome) = db.scope(|s| s.upsert_profile(user, &update))?;
            match outcome {
                Upsert::Created => println!("Profile created for {}.", user.name),
                Upsert::Updated => println!("Profile updated for {}.", user.name),
            }
            print_profile(&profile);
            Ok(())
        }
        ProfileCmd::Show => {
            match db.scope(|s| s.find_profile(user.id))? {
                Some(p) => print_profile(&p),
                None => println!("(no profile)"),
            }
            Ok(())
        }
    }
}

fn handle_tx(db: &mut Db, session: &Session, cfg: &AppConfig, cmd: TxCmd) -> Result<()> {
    let user = &session.user;
    match cmd {
        TxCmd::Add {
            amount,
            category,
            description,
            kind,
            date,
            tags,
        } => {
            let amount = validate::amount(&amount)?;
            let category = validate::category(&category)?;
            let description = validate::description(&description)?;
            let date = validate::date(date.as_deref(), now_utc().date_naive())?;

            let (tx, missing) = db.scope(|s| {
                let resolution = resolve_tags(&tags, |name| s.find_tag_by_name(name))?;
                debug!(tags = ?resolution.names(), "resolved tags");
                let tx = s.insert_transaction(
                    &NewTransaction {
                        user_id: user.id,
                        amount,
                        description,
                        category,
                        transaction_type: kind,
                        transaction_date: date,
                    },
                    &resolution.ids(),
                )?;
                Ok((tx, resolution.missing))
            })?;

            for name in &missing {
                eprintln!("Warning: tag '{name}' not found, skipping.");
            }
            println!(
                "Added {} {} in {} on {}.",
                tx.transaction_type,
                format_currency(tx.amount),
                tx.category,
                tx.transaction_date
            );
            if !tx.tags.is_empty() {
                println!("Tags: {}", tx.tags.join(", "));
            }
            Ok(())
        }
        TxCmd::List { limit, format } => {
            let limit = limit.unwrap_or(cfg.transaction_list_limit);
            let txs = db.scope(|s| s.list_transactions(user.id, limit))?;
            if txs.is_empty() {
                println!("(no transactions)");
                return Ok(());
            }

            match format {
                ListFormat::Table => {
                    let rows: Vec<Vec<String>> = txs
                        .iter()
                        .map(|t| {
                            let signed = match t.transaction_type {
                                TransactionType::Income => t.amount,
                                TransactionType::Expense => -t.amount,
                            };
                            vec![
                                t.transaction_date.to_string(),
                                t.transaction_type.to_string(),
                                t.category.clone(),
                                format_currency(signed),
                                t.description.clone(),
                                t.tags.join(", "),
                            ]
                        })
                        .collect();
                    print_table(
                        &["Date", "Type", "Category", "Amount", "Description", "Tags"],
                        &rows,
                    );
                }
                ListFormat::Tsv => {
                    let rows: Vec<Vec<String>> = txs
                        .iter()
                        .map(|t| {
                            vec![
                                t.transaction_date.to_string(),
                                t.transaction_type.to_string(),
                                t.category.clone(),
                                t.amount.to_string(),
                                t.description.clone(),
                                t.tags.join(","),
                            ]
                        })
                        .collect();
                    print_tsv(
                        &["date", "type", "category", "amount", "description", "tags"],
                        &rows,
                    );
                }
            }
            Ok(())
        }
    }
}

fn handle_budget(db: &mut Db, session: &Session, cmd: BudgetCmd) -> Result<()> {
    let user = &session.user;
    match cmd {
        BudgetCmd::Set {
            category,
            limit,
            month,
            description,
        } => {
            let category = validate::category(&category)?;
            let limit_amount = validate::limit(&limit)?;
            let month = resolve_month(month.as_deref())?;
            let description = description
                .as_deref()
                .map(validate::description)
                .transpose()?;

            let (budget, outcome) = db.scope(|s| {
                s.upsert_budget(&NewBudget {
                    user_id: user.id,
                    category,
                    limit_amount,
                    month,
                    description,
                })
            })?;
            let verb = match outcome {
                Upsert::Created => "Created",
                Upsert::Updated => "Updated",
            };
            println!(
                "{verb} budget for {} ({}): {}",
                budget.category,
                budget.month,
                format_currency(budget.limit_amount)
            );
            Ok(())
        }
        BudgetCmd::List { month, format } => {
            let month = resolve_month(month.as_deref())?;
            let (budgets, txs) = db.scope(|s| {
                Ok((
                    s.budgets_for_month(user.id, month)?,
                    s.transactions_in_month(user.id, month)?,
                ))
            })?;
            if budgets.is_empty() {
                println!("(no budgets for {month})");
                return Ok(());
            }

            let mut rows = Vec::with_capacity(budgets.len());
            for b in &budgets {
                let status = compute_budget_status(b, &txs);
                let label = if status.over_budget { "Over" } else { "Good" };
                rows.push(match format {
                    ListFormat::Table => vec![
                        b.category.clone(),
                        format_currency(b.limit_amount),
                        format_currency(status.spent),
                        format_currency(status.remaining),
                        format_percentage(usage_percentage(b, &status)),
                        label.to_string(),
                    ],
                    ListFormat::Tsv => vec![
                        month.to_string(),
                        b.category.clone(),
                        b.limit_amount.to_string(),
                        status.spent.to_string(),
                        status.remaining.to_string(),
                        label.to_string(),
                    ],
                });
            }

            match format {
                ListFormat::Table => {
                    println!("Budgets for {month}");
                    print_table(
                        &["Category", "Budget", "Spent", "Remaining", "Progress", "Status"],
                        &rows,
                    );
                }
                ListFormat::Tsv => print_tsv(
                    &["month", "category", "limit", "spent", "remaining", "status"],
                    &rows,
                ),
            }
            Ok(())
        }
    }
}

fn handle_goal(db: &mut Db, session: &Session, cfg: &AppConfig, cmd: GoalCmd) -> Result<()> {
    let user = &session.user;
    match cmd {
        GoalCmd::Add {
            name,
            target,
            description,
        } => {
            let name = validate::name(&name)?;
            let target_amount = validate::amount(&target)?;
            let description = description
                .as_deref()
                .map(validate::description)
                .transpose()?;

            let goal = db.scope(|s| {
                if s.find_goal(user.id, &name)?.is_some() {
                    return Err(TrackerError::already_exists("Savings goal", name.clone()).into());
                }
                s.insert_goal(&NewSavingsGoal {
                    user_id: user.id,
                    name: name.clone(),
                    target_amount,
                    description,
                })
            })?;
            println!(
                "Created savings goal '{}' with target {}.",
                goal.name,
                format_currency(goal.target_amount)
            );
            Ok(())
        }
        GoalCmd::Contribute { name, amount } => {
            let amount = validate::amount(&amount)?;

            let (goal, was_achieved) = db.scope(|s| {
                let mut goal = s
                    .find_goal(user.id, &name)?
                    .ok_or_else(|| TrackerError::not_found("Savings goal", name.clone()))?;
                let was_achieved = goal.is_achieved;
                add_contribution(&mut goal, amount);
                s.update_goal(&goal)?;
                Ok((goal, was_achieved))
            })?;

            let progress = GoalProgress::of(&goal);
            println!(
                "Added {} to '{}'. Saved {} of {} ({}).",
                format_currency(amount),
                progress.name,
                format_currency(progress.current),
                format_currency(progress.target),
                format_percentage(progress.percentage)
            );
            if progress.achieved && !was_achieved {
                println!("Goal '{}' achieved!", progress.name);
            }
            Ok(())
        }
        GoalCmd::List { format } => {
            let goals = db.scope(|s| s.list_goals(user.id))?;
            if goals.is_empty() {
                println!("(no savings goals)");
                return Ok(());
            }

            let progress: Vec<GoalProgress> = goals.iter().map(GoalProgress::of).collect();
            match format {
                ListFormat::Table => {
                    let rows: Vec<Vec<String>> = progress
                        .iter()
                        .map(|p| {
                            vec![
                                p.name.clone(),
                                format_currency(p.current),
                                format_currency(p.target),
                                format_percentage(p.percentage),
                                format_currency(p.remaining),
                                if p.achieved { "Complete" } else { "In progress" }.to_string(),
                            ]
                        })
                        .collect();
                    print_table(
                        &["Goal", "Saved", "Target", "Progress", "Remaining", "Status"],
                        &rows,
                    );
                }
                ListFormat::Tsv => {
                    let rows: Vec<Vec<String>> = progress
                        .iter()
                        .map(|p| {
                            vec![
                                p.name.clone(),
                                p.current.to_string(),
                                p.target.to_string(),
                                p.percentage.round_dp(1).to_string(),
                                p.remaining.to_string(),
                                p.achieved.to_string(),
                            ]
                        })
                        .collect();
                    print_tsv(
                        &["name", "current", "target", "percent", "remaining", "achieved"],
                        &rows,
                    );
                }
            }
            Ok(())
        }
        GoalCmd::Status { name } => {
            let goal = db
                .scope(|s| s.find_goal(user.id, &name))?
                .ok_or_else(|| TrackerError::not_found("Savings goal", name.clone()))?;
            let p = GoalProgress::of(&goal);

            let mut lines = vec![
                (
                    "Progress",
                    format!(
                        "{} {}",
                        progress_bar(p.percentage, cfg.progress_bar_width),
                        format_percentage(p.percentage)
                    ),
                ),
                ("Saved", format_currency(p.current)),
                ("Target", format_currency(p.target)),
                ("Remaining", format_currency(p.remaining)),
                (
                    "Status",
                    if p.achieved { "Achieved" } else { "In progress" }.to_string(),
                ),
            ];
            if let Some(d) = &goal.description {
                lines.push(("Description", d.clone()));
            }
            print_panel(&p.name, &lines);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    #[serde(flatten)]
    report: &'a ReportData,
    expense_breakdown: Vec<CategoryShare>,
    income_breakdown: Vec<CategoryShare>,
}

fn handle_report(
    db: &mut Db,
    session: &Session,
    month: Option<&str>,
    format: ReportFormat,
) -> Result<()> {
    let month = resolve_month(month)?;
    let txs = db.scope(|s| s.transactions_in_month(session.user.id, month))?;
    let report = generate_report(&txs, month);

    if format == ReportFormat::Json {
        let json = match &report {
            Some(r) => serde_json::to_string_pretty(&ReportJson {
                report: r,
                expense_breakdown: r.expense_breakdown(),
                income_breakdown: r.income_breakdown(),
            })?,
            None => "null".to_string(),
        };
        println!("{json}");
        return Ok(());
    }

    let Some(report) = report else {
        println!("(no transactions for {month})");
        return Ok(());
    };

    print_panel(
        &format!("Financial report for {month}"),
        &[
            ("Income", format_currency(report.total_income)),
            ("Expenses", format_currency(report.total_expenses)),
            ("Net", format_currency(report.net_income)),
            ("Transactions", report.transaction_count.to_string()),
        ],
    );

    for (title, shares) in [
        ("Expenses by category", report.expense_breakdown()),
        ("Income by category", report.income_breakdown()),
    ] {
        if shares.is_empty() {
            continue;
        }
        println!();
        println!("{title}");
        let rows: Vec<Vec<String>> = shares
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    format_currency(c.amount),
                    format_percentage(c.percentage),
                ]
            })
            .collect();
        print_table(&["Category", "Amount", "Share"], &rows);
    }
    Ok(())
}

fn handle_tag(db: &mut Db, cmd: TagCmd) -> Result<()> {
    match cmd {
        TagCmd::Add {
            name,
            description,
            color,
        } => {
            let name = validate::name(&name)?;
            let color = match color.as_deref() {
                Some(c) => validate::color(c)?,
                None => DEFAULT_TAG_COLOR.to_string(),
            };
            let description = description
                .as_deref()
                .map(validate::description)
                .transpose()?;

            let tag = db.scope(|s| {
                if s.find_tag_by_name(&name)?.is_some() {
                    return Err(TrackerError::already_exists("Tag", name.clone()).into());
                }
                s.insert_tag(&NewTag {
                    name: name.clone(),
                    description,
                    color,
                })
            })?;
            println!("Created tag '{}' ({}).", tag.name, tag.color);
            Ok(())
        }
        TagCmd::List { format } => {
            let tags = db.scope(|s| s.list_tags())?;
            if tags.is_empty() {
                println!("(no tags)");
                return Ok(());
            }

            let rows: Vec<Vec<String>> = tags
                .iter()
                .map(|(t, count)| {
                    vec![
                        t.name.clone(),
                        t.color.clone(),
                        t.description.clone().unwrap_or_default(),
                        count.to_string(),
                    ]
                })
                .collect();
            match format {
                ListFormat::Table => {
                    print_table(&["Name", "Color", "Description", "Transactions"], &rows)
                }
                ListFormat::Tsv => {
                    print_tsv(&["name", "color", "description", "transactions"], &rows)
                }
            }
            Ok(())
        }
    }
}

fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let s = line.trim();
    if s.is_empty() {
        return Ok(default);
    }
    Ok(matches!(s.to_ascii_lowercase().as_str(), "y" | "yes"))
}
