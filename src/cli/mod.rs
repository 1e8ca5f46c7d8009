// CLI module for fintrack
// Author: kelexine (https://github.com/kelexine)

use crate::models::{BudgetPeriod, TransactionType};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};

/// fintrack - personal finance tracker client
#[derive(Parser, Debug)]
#[command(name = "fintrack", version, about, long_about = None)]
pub struct Args {
    /// Backend API base URL (overrides config file and environment)
    #[arg(long, env = "FINTRACK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Path of the token file
    #[arg(long, global = true)]
    pub tokens_path: Option<String>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Alternate config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the issued tokens
    Login {
        #[arg(long, short)]
        username: String,
        #[arg(long, short, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (logs in on success)
    Register(RegisterArgs),
    /// Log out and forget stored tokens
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Show totals, recent transactions and budget status
    Dashboard,
    /// Manage transactions
    #[command(subcommand)]
    Transactions(TransactionCommand),
    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Manage budgets
    #[command(subcommand)]
    Budgets(BudgetCommand),
    /// Income/expense report for a date range
    Report(RangeArgs),
    /// Download transactions as CSV
    Export {
        #[command(flatten)]
        range: RangeArgs,
        /// Directory to save into
        #[arg(long, default_value = ".")]
        dir: String,
    },
    /// Manage notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// Convert an amount between currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(ClapArgs, Debug)]
pub struct RegisterArgs {
    #[arg(long, short)]
    pub username: String,
    #[arg(long, short)]
    pub email: String,
    #[arg(long, short, env = "FINTRACK_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(ClapArgs, Debug, Default)]
pub struct RangeArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommand {
    List {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        category: Option<u64>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        id: u64,
    },
    Add {
        #[arg(long)]
        amount: f64,
        #[arg(long = "type")]
        kind: TransactionType,
        #[arg(long)]
        category: u64,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        id: u64,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long)]
        category: Option<u64>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List,
    Show {
        id: u64,
    },
    Add {
        name: String,
        #[arg(long = "type")]
        kind: TransactionType,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    Delete {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    List,
    Show {
        id: u64,
    },
    Add {
        #[arg(long)]
        category: u64,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        period: BudgetPeriod,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    Update {
        id: u64,
        #[arg(long)]
        category: Option<u64>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        period: Option<BudgetPeriod>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    Delete {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    List,
    /// Mark one notification as read
    Read {
        id: u64,
    },
    /// Mark every notification as read
    ReadAll,
}
