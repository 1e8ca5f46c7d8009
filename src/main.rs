// fintrack - personal finance tracker client
// Author: kelexine (https://github.com/kelexine)

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fintrack::cli::{
    Args, BudgetCommand, CategoryCommand, Command, NotificationCommand, RangeArgs,
    TransactionCommand,
};
use fintrack::client::watch_expiry;
use fintrack::config::AppConfig;
use fintrack::models::{
    BudgetForm, BudgetUpdate, CategoryForm, CategoryUpdate, DateRange, LoginRequest,
    RegisterRequest, TransactionFilter, TransactionForm, TransactionUpdate,
};
use fintrack::services::Services;
use fintrack::storage::FileTokenStore;
use fintrack::utils::{currency, logging};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags win
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(path) = &args.tokens_path {
        config.storage.tokens_path = path.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    debug!("Starting fintrack v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Open token storage and build services
    let tokens = FileTokenStore::open(&config.storage.tokens_path)
        .with_context(|| format!("opening token store {}", config.storage.tokens_path))?;
    let services = Services::new(&config, Arc::new(tokens))?;

    // Phase 4: React to session expiry the way a UI shell would: send the user to login
    let watcher = tokio::spawn(watch_expiry(services.client.subscribe(), |notice| {
        eprintln!("{}", notice)
    }));

    // Phase 5: Run the command
    let result = run(args.command, &services, &config).await;

    // Dropping the services closes the event channel; the watcher prints
    // whatever is still queued and then exits.
    drop(services);
    if let Err(e) = watcher.await {
        debug!("Session watcher ended abnormally: {}", e);
    }

    if args.print_metrics {
        eprintln!("{}", fintrack::metrics::gather_metrics());
    }

    result
}

async fn run(command: Command, services: &Services, config: &AppConfig) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let response = services
                .auth
                .login(&LoginRequest::new(username, password))
                .await?;
            info!("Logged in");
            println!("Logged in as {}", response.user.display_name());
        }
        Command::Register(reg) => {
            let request = RegisterRequest {
                username: reg.username.clone(),
                email: reg.email.clone(),
                password: reg.password.clone(),
                confirm_password: reg.password.clone(),
                first_name: reg.first_name.clone(),
                last_name: reg.last_name.clone(),
            };
            let response = services.auth.register(&request).await?;
            println!("Registered and logged in as {}", response.user.username);
        }
        Command::Logout => {
            services.auth.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => print_json(&services.auth.current_user().await?)?,
        Command::Refresh => {
            services.auth.refresh_token().await?;
            println!("Access token refreshed");
        }
        Command::Dashboard => print_json(&services.dashboard.overview().await?)?,
        Command::Transactions(cmd) => run_transactions(cmd, services).await?,
        Command::Categories(cmd) => run_categories(cmd, services).await?,
        Command::Budgets(cmd) => run_budgets(cmd, services).await?,
        Command::Report(range) => {
            print_json(&services.reports.report(&date_range(&range)).await?)?
        }
        Command::Export { range, dir } => {
            let file = services.reports.export(&date_range(&range)).await?;
            let path = file
                .save_in(Path::new(&dir))
                .with_context(|| format!("saving {} into {}", file.filename, dir))?;
            println!("Saved {}", path.display());
        }
        Command::Notifications(cmd) => match cmd {
            NotificationCommand::List => print_json(&services.notifications.list().await?)?,
            NotificationCommand::Read { id } => services.notifications.mark_read(id).await?,
            NotificationCommand::ReadAll => services.notifications.mark_all_read().await?,
        },
        Command::Convert { amount, from, to } => {
            let (from, to) = (from.to_uppercase(), to.to_uppercase());
            let converted = currency::convert_currency(amount, &from, &to).ok_or_else(|| {
                anyhow!(
                    "unsupported currency pair {} -> {} (known: {})",
                    from,
                    to,
                    currency::supported_currencies().collect::<Vec<_>>().join(", ")
                )
            })?;
            println!("{}", currency::format_currency(converted, &to));
        }
        Command::Config => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}

async fn run_transactions(cmd: TransactionCommand, services: &Services) -> Result<()> {
    let svc = &services.transactions;
    match cmd {
        TransactionCommand::List {
            range,
            category,
            kind,
            min,
            max,
            search,
            page,
        } => {
            let filter = TransactionFilter {
                start_date: range.start,
                end_date: range.end,
                category,
                kind,
                amount_min: min,
                amount_max: max,
                search,
                page,
            };
            print_json(&svc.list(&filter).await?)?;
        }
        TransactionCommand::Show { id } => print_json(&svc.get(id).await?)?,
        TransactionCommand::Add {
            amount,
            kind,
            category,
            date,
            description,
        } => {
            let form = TransactionForm {
                category,
                amount,
                kind,
                description,
                date,
            };
            print_json(&svc.create(&form).await?)?;
        }
        TransactionCommand::Update {
            id,
            amount,
            kind,
            category,
            date,
            description,
        } => {
            let update = TransactionUpdate {
                category,
                amount,
                kind,
                description,
                date,
            };
            if update.is_empty() {
                return Err(anyhow!("nothing to update for transaction {}", id));
            }
            print_json(&svc.update(id, &update).await?)?;
        }
        TransactionCommand::Delete { id } => {
            svc.delete(id).await?;
            println!("Deleted transaction {}", id);
        }
    }
    Ok(())
}

async fn run_categories(cmd: CategoryCommand, services: &Services) -> Result<()> {
    let svc = &services.categories;
    match cmd {
        CategoryCommand::List => print_json(&svc.list().await?)?,
        CategoryCommand::Show { id } => print_json(&svc.get(id).await?)?,
        CategoryCommand::Add { name, kind } => {
            print_json(&svc.create(&CategoryForm { name, kind }).await?)?
        }
        CategoryCommand::Update { id, name, kind } => {
            print_json(&svc.update(id, &CategoryUpdate { name, kind }).await?)?
        }
        CategoryCommand::Delete { id } => {
            svc.delete(id).await?;
            println!("Deleted category {}", id);
        }
    }
    Ok(())
}

async fn run_budgets(cmd: BudgetCommand, services: &Services) -> Result<()> {
    let svc = &services.budgets;
    match cmd {
        BudgetCommand::List => print_json(&svc.list().await?)?,
        BudgetCommand::Show { id } => print_json(&svc.get(id).await?)?,
        BudgetCommand::Add {
            category,
            amount,
            period,
            start,
            end,
        } => {
            let form = BudgetForm {
                category,
                amount,
                period,
                start_date: start,
                end_date: end,
            };
            print_json(&svc.create(&form).await?)?;
        }
        BudgetCommand::Update {
            id,
            category,
            amount,
            period,
            start,
            end,
        } => {
            let update = BudgetUpdate {
                category,
                amount,
                period,
                start_date: start,
                end_date: end,
            };
            print_json(&svc.update(id, &update).await?)?;
        }
        BudgetCommand::Delete { id } => {
            svc.delete(id).await?;
            println!("Deleted budget {}", id);
        }
    }
    Ok(())
}

fn date_range(range: &RangeArgs) -> DateRange {
    DateRange {
        start: range.start,
        end: range.end,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
