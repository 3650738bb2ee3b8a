use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveTime;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expensetrack::cli::{
    clearable, create_request, list_query, update_request, Cli, Commands, OutputFormat,
};
use expensetrack::output::{format_output, json, pretty};
use expensetrack::{storage, Config, ExpenseRepository};
use expensetrack_core::expense::now;
use expensetrack_core::storage::{repository_error_to_exit_code, RepositoryError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            match err.downcast_ref::<RepositoryError>() {
                Some(repo_err) => ExitCode::from(repository_error_to_exit_code(repo_err)),
                None => ExitCode::FAILURE,
            }
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// `LOG_FORMAT=json` switches to structured JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "expensetrack=info,expensetrack_core=info".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(store = %config.target_display(), "Loaded configuration");

    let store = storage::connect(&config).await?;
    let repository = ExpenseRepository::new(store).with_default_limit(config.list_default_limit);
    let user = cli.user.as_str();

    match cli.command {
        Commands::Create {
            merchant,
            amount,
            date,
            category,
            receipt,
            others,
        } => {
            let request = create_request(merchant, amount, date, category, receipt, others);
            let expense = repository.create(user, request).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&expense, cli.format)),
                OutputFormat::Pretty => {
                    println!("Created:\n{}", pretty::format_expense(&expense))
                }
            }
        }
        Commands::Get { id, receipt_date } => {
            let expense = match receipt_date {
                Some(receipt_date) => repository.get_by_key(user, receipt_date, id).await?,
                None => repository.get_by_id(user, id).await?,
            };
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&expense, cli.format)),
                OutputFormat::Pretty => println!("{}", pretty::format_expense(&expense)),
            }
        }
        Commands::List {
            start,
            end,
            month,
            category,
            limit,
            cursor,
        } => {
            let query = list_query(start, end, month, category, limit, cursor)
                .map_err(RepositoryError::Validation)?;
            let page = repository.list_by_user(user, &query).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", json::format_page_json(&page)),
                OutputFormat::Pretty => println!("{}", pretty::format_page(&page)),
            }
        }
        Commands::Update {
            id,
            merchant,
            category,
            clear_category,
            amount,
            date,
            receipt,
            clear_receipt,
            others,
        } => {
            let request = update_request(
                merchant,
                clearable(category, clear_category),
                amount,
                date,
                clearable(receipt.into_receipt(), clear_receipt),
                others,
            );
            let expense = repository.update(user, id, request).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&expense, cli.format)),
                OutputFormat::Pretty => {
                    println!("Updated:\n{}", pretty::format_expense(&expense))
                }
            }
        }
        Commands::Delete { id } => {
            repository.delete(user, id).await?;
            if !cli.quiet {
                println!("Deleted expense {}", id);
            }
        }
        Commands::Seed { count, latest } => {
            let latest =
                latest.unwrap_or_else(|| now().date_naive().and_time(NaiveTime::MIN).and_utc());
            let expenses = repository.seed(user, latest, count).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&expenses, cli.format)),
                OutputFormat::Pretty => {
                    if !cli.quiet {
                        println!("Seeded {} expenses for user {}", expenses.len(), user);
                    }
                    println!("{}", pretty::format_expenses(&expenses));
                }
            }
        }
    }

    Ok(())
}
