use crate::domain::{RiskTolerance, TransactionType};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "fintrack")]
#[command(about = "Local-first personal finance tracker", long_about = None)]
pub struct Cli {
    /// Override fintrack home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "FINTRACK_HOME")]
    pub home: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as the user with this email, creating it on first use.
    Login(LoginArgs),
    Logout,
    User(UserArgs),
    Profile(ProfileArgs),
    Tx(TxArgs),
    Budget(BudgetArgs),
    Goal(GoalArgs),
    Report(ReportArgs),
    Tag(TagArgs),
    /// Populate the current user with sample tags, budgets, goals and transactions.
    Seed(SeedArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    #[default]
    Table,
    Tsv,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,
}

#[derive(Debug, Subcommand)]
pub enum UserCmd {
    Show,
    Set {
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        monthly_income: Option<String>,
    },
    /// Delete the current user and everything it owns.
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub cmd: UserCmd,
}

#[derive(Debug, Args)]
pub struct ProfileFields {
    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub occupation: Option<String>,

    #[arg(long)]
    pub annual_income: Option<String>,

    #[arg(long)]
    pub financial_goal: Option<String>,

    #[arg(long, value_enum, ignore_case = true)]
    pub risk_tolerance: Option<RiskTolerance>,

    #[arg(long)]
    pub currency: Option<String>,

    #[arg(long)]
    pub notifications: Option<bool>,

    #[arg(long)]
    pub dark_mode: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCmd {
    /// Create the profile, or change only the given fields.
    Set(ProfileFields),
    Show,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub cmd: ProfileCmd,
}

#[derive(Debug, Subcommand)]
pub enum TxCmd {
    Add {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long, short = 'm', default_value = "")]
        description: String,
        #[arg(long = "type", value_enum, ignore_case = true)]
        kind: TransactionType,
        /// YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Tag name; repeat or comma-separate for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    List {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t)]
        format: ListFormat,
    },
}

#[derive(Debug, Args)]
pub struct TxArgs {
    #[command(subcommand)]
    pub cmd: TxCmd,
}

#[derive(Debug, Subcommand)]
pub enum BudgetCmd {
    /// Create the budget, or replace its limit if it already exists for that month.
    Set {
        #[arg(long)]
        category: String,
        #[arg(long)]
        limit: String,
        /// YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: ListFormat,
    },
}

#[derive(Debug, Args)]
pub struct BudgetArgs {
    #[command(subcommand)]
    pub cmd: BudgetCmd,
}

#[derive(Debug, Subcommand)]
pub enum GoalCmd {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        description: Option<String>,
    },
    Contribute {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: String,
    },
    List {
        #[arg(long, value_enum, default_value_t)]
        format: ListFormat,
    },
    Status {
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct GoalArgs {
    #[command(subcommand)]
    pub cmd: GoalCmd,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(long)]
    pub month: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub format: ReportFormat,
}

#[derive(Debug, Subcommand)]
pub enum TagCmd {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    List {
        #[arg(long, value_enum, default_value_t)]
        format: ListFormat,
    },
}

#[derive(Debug, Args)]
pub struct TagArgs {
    #[command(subcommand)]
    pub cmd: TagCmd,
}

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Number of months to fill, ending with the current one.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub months: u32,
}
