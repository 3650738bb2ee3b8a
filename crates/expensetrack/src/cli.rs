//! CLI command definitions.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use uuid::Uuid;

use expensetrack_core::expense::{
    is_reserved_attribute, parse_amount, parse_receipt_date, CreateExpenseRequest,
    ListExpensesQuery, ReceiptRef, UpdateExpenseRequest,
};
use expensetrack_core::storage::{Cursor, DateRange, DateRangeError};

/// Expense tracker backed by a single-table key-value store.
#[derive(Debug, Parser)]
#[command(name = "expensetrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Owner of the expenses.
    #[arg(long, short, env = "EXPENSETRACK_USER_ID")]
    pub user: String,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Receipt image location flags.
#[derive(Debug, Clone, clap::Args)]
pub struct ReceiptArgs {
    /// Bucket holding the receipt image.
    #[arg(long, requires_all = ["receipt_key", "receipt_content_type"])]
    pub receipt_bucket: Option<String>,
    /// Object key of the receipt image.
    #[arg(long, requires = "receipt_bucket")]
    pub receipt_key: Option<String>,
    /// MIME type of the receipt image.
    #[arg(long, requires = "receipt_bucket")]
    pub receipt_content_type: Option<String>,
}

impl ReceiptArgs {
    pub fn into_receipt(self) -> Option<ReceiptRef> {
        match (self.receipt_bucket, self.receipt_key, self.receipt_content_type) {
            (Some(bucket), Some(key), Some(content_type)) => {
                Some(ReceiptRef::new(bucket, key, content_type))
            }
            _ => None,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a new expense.
    Create {
        /// Merchant name.
        #[arg(long)]
        merchant: String,
        /// Amount, up to two decimal places.
        #[arg(long, value_parser = parse_amount_arg)]
        amount: Decimal,
        /// Receipt date (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_receipt_date_arg)]
        date: DateTime<Utc>,
        /// Optional category.
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        receipt: ReceiptArgs,
        /// Free-form metadata as KEY=VALUE (repeatable).
        #[arg(long = "other", value_parser = parse_other_arg)]
        others: Vec<(String, String)>,
    },
    /// Get an expense by ID.
    Get {
        /// Expense ID.
        id: Uuid,
        /// Read by primary key instead of the ID index.
        #[arg(long, value_parser = parse_receipt_date_arg)]
        receipt_date: Option<DateTime<Utc>>,
    },
    /// List expenses ordered by receipt date.
    List {
        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        /// Whole month (YYYY-MM).
        #[arg(long, conflicts_with_all = ["start", "end"], value_parser = parse_month_arg)]
        month: Option<DateRange>,
        /// Case-insensitive category filter.
        #[arg(long)]
        category: Option<String>,
        /// Page size (1-100).
        #[arg(long)]
        limit: Option<u32>,
        /// Continuation token from a previous page.
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Update an expense.
    Update {
        /// Expense ID.
        id: Uuid,
        /// New merchant name.
        #[arg(long)]
        merchant: Option<String>,
        /// New category.
        #[arg(long)]
        category: Option<String>,
        /// Remove the category.
        #[arg(long, conflicts_with = "category")]
        clear_category: bool,
        /// New amount.
        #[arg(long, value_parser = parse_amount_arg)]
        amount: Option<Decimal>,
        /// New receipt date; moves the expense to a new key.
        #[arg(long, value_parser = parse_receipt_date_arg)]
        date: Option<DateTime<Utc>>,
        #[command(flatten)]
        receipt: ReceiptArgs,
        /// Detach the receipt image.
        #[arg(long, conflicts_with = "receipt_bucket")]
        clear_receipt: bool,
        /// Replace metadata with these KEY=VALUE pairs (repeatable).
        #[arg(long = "other", value_parser = parse_other_arg)]
        others: Vec<(String, String)>,
    },
    /// Delete an expense by ID.
    Delete {
        /// Expense ID.
        id: Uuid,
    },
    /// Generate demo expenses, one per day back from a date.
    Seed {
        /// Number of expenses to create.
        #[arg(long, default_value = "10")]
        count: u32,
        /// Receipt date of the newest expense (default: today).
        #[arg(long, value_parser = parse_receipt_date_arg)]
        latest: Option<DateTime<Utc>>,
    },
}

/// Build a create request from `create` flags.
pub fn create_request(
    merchant: String,
    amount: Decimal,
    date: DateTime<Utc>,
    category: Option<String>,
    receipt: ReceiptArgs,
    others: Vec<(String, String)>,
) -> CreateExpenseRequest {
    let mut request = CreateExpenseRequest::new(merchant, amount, date);
    request.category = category;
    request.receipt = receipt.into_receipt();
    request.others = others.into_iter().collect();
    request
}

/// Pairs a "set" flag with its "clear" flag: `Some(None)` clears the field.
pub fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Build an update patch from `update` flags.
pub fn update_request(
    merchant: Option<String>,
    category: Option<Option<String>>,
    amount: Option<Decimal>,
    date: Option<DateTime<Utc>>,
    receipt: Option<Option<ReceiptRef>>,
    others: Vec<(String, String)>,
) -> UpdateExpenseRequest {
    UpdateExpenseRequest {
        merchant_name: merchant,
        category,
        amount,
        receipt_date: date,
        receipt,
        others: (!others.is_empty()).then(|| others.into_iter().collect::<BTreeMap<_, _>>()),
    }
}

/// Build a listing query from `list` flags.
pub fn list_query(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    month: Option<DateRange>,
    category: Option<String>,
    limit: Option<u32>,
    cursor: Option<String>,
) -> Result<ListExpensesQuery, String> {
    let date_range = match (month, start, end) {
        (Some(range), _, _) => Some(range),
        (None, Some(start), Some(end)) => {
            Some(DateRange::new(start, end).map_err(|e| e.to_string())?)
        }
        _ => None,
    };
    let cursor = cursor
        .map(|token| Cursor::decode(&token))
        .transpose()
        .map_err(|e| e.to_string())?;

    Ok(ListExpensesQuery {
        date_range,
        category,
        limit,
        cursor,
    })
}

fn parse_amount_arg(s: &str) -> Result<Decimal, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

fn parse_receipt_date_arg(s: &str) -> Result<DateTime<Utc>, String> {
    parse_receipt_date(s).map_err(|e| e.to_string())
}

fn parse_month_arg(s: &str) -> Result<DateRange, String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year '{year}'"))?;
    let month: u32 = month.parse().map_err(|_| format!("invalid month '{month}'"))?;
    DateRange::month(year, month).map_err(|e: DateRangeError| e.to_string())
}

fn parse_other_arg(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("metadata key cannot be empty".to_string());
    }
    if is_reserved_attribute(key) {
        return Err(format!("'{key}' is a reserved attribute name"));
    }
    Ok((key.to_string(), value.to_string()))
}
