use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use shared::models::month::ReportingMonth;
use shared::services::preferences_service::Theme;

#[derive(Parser, Debug)]
#[command(name = "finance")]
#[command(about = "Personal finance tracker client", long_about = None)]
pub struct Cli {
    /// Backend API base URL
    #[arg(long, global = true, env = "FINANCE_API_BASE_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FINANCE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FINANCE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user and household context
    Whoami,

    /// Account settings
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Manage expenses
    #[command(subcommand)]
    Expenses(ExpenseCommands),

    /// Monthly totals, average, salary and category breakdown
    Summary {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<ReportingMonth>,
    },

    /// Manage the monthly salary
    #[command(subcommand)]
    Salary(SalaryCommands),

    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommands),

    /// Ideal budget share per category
    #[command(subcommand)]
    Rules(RuleCommands),

    /// Join another household with its invite code
    Link { code: String },

    /// Leave the shared household
    Unlink,

    /// Switch between the personal and shared household
    ToggleContext,

    /// User administration
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Show or change the theme preference
    Theme { theme: Option<Theme> },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    Show,
    Rename { username: String },
    Password {
        #[arg(long, env = "FINANCE_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// List expenses of a month, or of a date range with --from/--to
    List {
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<ReportingMonth>,
        /// First day to include
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Category id or name
        #[arg(long)]
        category: Option<String>,
        /// Print per-day totals of the month instead of single expenses
        #[arg(long, conflicts_with_all = ["from", "to", "category"])]
        by_day: bool,
    },

    /// Record a new expense
    Add {
        #[arg(long)]
        value: Decimal,
        /// Category id or name
        #[arg(long)]
        category: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "DEBIT")]
        payment_method: String,
        #[arg(long)]
        card: Option<String>,
        #[arg(long, default_value_t = 1)]
        installments: u32,
        #[arg(long)]
        paid: bool,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Delete an expense
    Delete { id: String },

    /// Mark an expense as paid (or unpaid with --unpaid)
    Pay {
        id: String,
        #[arg(long)]
        unpaid: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SalaryCommands {
    /// Record the salary of a month
    Set {
        value: Decimal,
        #[arg(long)]
        month: Option<ReportingMonth>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    List,
    Add {
        name: String,
        #[arg(long, default_value = "mdi-tag")]
        icon: String,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// Set ideal percentages, e.g. `rules set FOOD=30 RENT=40`
    Set {
        #[arg(required = true, value_parser = parse_rule)]
        rules: Vec<(String, Decimal)>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    Users,
    Activate { id: i64 },
    Deactivate { id: i64 },
    AllowLinking {
        id: i64,
        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },
    Delete { id: i64 },
}

fn parse_rule(raw: &str) -> Result<(String, Decimal), String> {
    let (name, percentage) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PERCENT, got `{}`", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing category name in `{}`", raw));
    }
    let percentage: Decimal = percentage
        .trim()
        .parse()
        .map_err(|e| format!("invalid percentage in `{}`: {}", raw, e))?;
    Ok((name.to_string(), percentage))
}
