use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{keys, Cursor, DateRangeError};
use crate::expense::{total_amount, Expense};

/// A date range with inclusive start and end dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Creates a date range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Creates a date range for an entire month.
    pub fn month(year: i32, month: u32) -> Result<Self, DateRangeError> {
        let start =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(DateRangeError::InvalidMonth)?;

        // Last day of the month: first of next month minus a day
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .and_then(|d| d.pred_opt())
        .ok_or(DateRangeError::InvalidMonth)?;

        Ok(Self { start, end })
    }

    /// Returns true if the receipt date falls within the range.
    pub fn contains(&self, receipt_date: DateTime<Utc>) -> bool {
        let day = receipt_date.date_naive();
        self.start <= day && day <= self.end
    }
}

/// Primary key coordinates of a stored expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpenseKey {
    pub user_id: String,
    pub receipt_date: DateTime<Utc>,
    pub expense_id: Uuid,
}

impl ExpenseKey {
    pub fn new(user_id: impl Into<String>, receipt_date: DateTime<Utc>, expense_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            receipt_date,
            expense_id,
        }
    }

    /// Partition key value.
    pub fn pk(&self) -> String {
        keys::expense_pk(&self.user_id)
    }

    /// Sort key value.
    pub fn sk(&self) -> String {
        keys::expense_sk(self.receipt_date, self.expense_id)
    }
}

/// A store-level page request over a single user partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub date_range: Option<DateRange>,
    pub limit: u32,
    pub cursor: Option<Cursor>,
}

/// One page of expenses ordered by receipt date ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    /// Present when the store may hold more items after this page.
    pub next_cursor: Option<Cursor>,
}

impl ExpensePage {
    /// Sum of the amounts on this page.
    pub fn total_amount(&self) -> Decimal {
        total_amount(&self.expenses)
    }

    /// Returns true if there is nothing left to fetch.
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}
