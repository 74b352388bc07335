//! Cashbook models
//!
//! Employees, the transactions recorded against them, and the two derived
//! report shapes. Nothing derived is ever persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input rejected by the reconciliation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("Unknown transaction kind '{0}', expected 'collection' or 'deposit'")]
    UnknownKind(String),

    #[error("Amount must not be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount exceeds the maximum of 999999999999999.9999: {0}")]
    AmountTooLarge(Decimal),

    #[error("Amount has more than 4 decimal places: {0}")]
    AmountPrecision(Decimal),

    #[error("Totals exceed the representable amount range")]
    AmountOverflow,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Date outside years 1000-9999: {0}")]
    DateOutOfRange(String),

    #[error("Transaction belongs to employee {found}, not {expected}")]
    ForeignTransaction { expected: String, found: String },
}

/// Decimal places kept for amounts. Matches the `DECIMAL(19, 4)` column.
pub const AMOUNT_SCALE: u32 = 4;

/// Largest recordable amount, `999999999999999.9999`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, AMOUNT_SCALE);

/// Year range accepted for occurrence timestamps.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

/// Employee identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
}

impl Employee {
    pub fn new(employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
        }
    }
}

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Cash collected in the field; raises the outstanding balance
    Collection,
    /// Cash handed in to the bank; lowers it
    Deposit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Collection => "collection",
            TransactionKind::Deposit => "deposit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collection" => Ok(TransactionKind::Collection),
            "deposit" => Ok(TransactionKind::Deposit),
            other => Err(ReconcileError::UnknownKind(other.to_string())),
        }
    }
}

/// A recorded cash movement. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub employee_id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub occurred_on: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new, not yet stored transaction.
    pub fn new(
        employee_id: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        occurred_on: DateTime<Utc>,
    ) -> Result<Self, ReconcileError> {
        if amount < Decimal::ZERO {
            return Err(ReconcileError::NegativeAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(ReconcileError::AmountTooLarge(amount));
        }
        if amount.normalize().scale() > AMOUNT_SCALE {
            return Err(ReconcileError::AmountPrecision(amount));
        }
        check_year(occurred_on)?;

        // Stored timestamps keep millisecond precision.
        Ok(Self {
            id: None,
            employee_id: employee_id.into(),
            kind,
            amount,
            occurred_on: occurred_on.trunc_subsecs(3),
            recorded_at: None,
        })
    }

    /// UTC calendar day used for ledger grouping.
    pub fn occurred_date(&self) -> NaiveDate {
        self.occurred_on.date_naive()
    }

    /// Check that this transaction can enter a computation for `employee_id`.
    pub fn validate_for(&self, employee_id: &str) -> Result<(), ReconcileError> {
        if self.employee_id != employee_id {
            return Err(ReconcileError::ForeignTransaction {
                expected: employee_id.to_string(),
                found: self.employee_id.clone(),
            });
        }
        if self.amount < Decimal::ZERO {
            return Err(ReconcileError::NegativeAmount(self.amount));
        }
        Ok(())
    }
}

/// Parse an occurrence timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00+05:30`), a naive date-time taken as
/// UTC (`2024-01-15T10:30:00`), or a bare date meaning midnight UTC.
pub fn parse_occurred_on(value: &str) -> Result<DateTime<Utc>, ReconcileError> {
    let value = value.trim();

    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc()
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| ReconcileError::InvalidDate(value.to_string()))?
    };

    check_year(parsed)?;
    Ok(parsed)
}

fn check_year(at: DateTime<Utc>) -> Result<(), ReconcileError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&at.year()) {
        Ok(())
    } else {
        Err(ReconcileError::DateOutOfRange(at.to_rfc3339()))
    }
}

/// Outstanding balance of one employee over their whole history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingSummary {
    pub employee_id: String,
    pub name: String,
    pub net_collection: Decimal,
    pub total_deposit: Decimal,
    pub last_transaction_date: Option<DateTime<Utc>>,
    /// `net_collection - total_deposit`; negative means over-deposited
    pub difference: Decimal,
}

/// One day of an employee's running-balance ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub employee_name: String,
    pub employee_id: String,
    pub collection_amount: Decimal,
    /// Deposits of the day as recorded, before any carry-over offset
    pub deposit_amount: Decimal,
    /// Part of the day's deposits that paid down balance carried from earlier days
    pub applied_deposit: Decimal,
    /// Remainder of the day's deposits after the carried balance was cleared
    pub excess_deposit: Decimal,
    /// `collection_amount - deposit_amount` of this day alone
    pub daily_difference: Decimal,
    /// Running balance after this day
    pub difference: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("collection".parse::<TransactionKind>(), Ok(TransactionKind::Collection));
        assert_eq!("deposit".parse::<TransactionKind>(), Ok(TransactionKind::Deposit));
        assert_eq!(
            "refund".parse::<TransactionKind>(),
            Err(ReconcileError::UnknownKind("refund".to_string()))
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let result = Transaction::new("EMP001", TransactionKind::Deposit, dec!(-0.01), at);
        assert_eq!(result, Err(ReconcileError::NegativeAmount(dec!(-0.01))));

        let zero = Transaction::new("EMP001", TransactionKind::Deposit, dec!(0), at);
        assert!(zero.is_ok());
    }

    #[test]
    fn test_amount_limits() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let new = |amount| Transaction::new("EMP001", TransactionKind::Collection, amount, at);

        assert_eq!(MAX_AMOUNT, dec!(999999999999999.9999));
        assert!(new(MAX_AMOUNT).is_ok());
        assert_eq!(
            new(dec!(1000000000000000)),
            Err(ReconcileError::AmountTooLarge(dec!(1000000000000000)))
        );
        assert_eq!(
            new(Decimal::MAX),
            Err(ReconcileError::AmountTooLarge(Decimal::MAX))
        );

        assert_eq!(new(dec!(0.00005)), Err(ReconcileError::AmountPrecision(dec!(0.00005))));
        assert!(new(dec!(0.0001)).is_ok());
        // Trailing zeros do not count as precision.
        assert!(new(dec!(1.500000)).is_ok());
    }

    #[test]
    fn test_year_limits() {
        assert!(matches!(
            parse_occurred_on("0999-12-31"),
            Err(ReconcileError::DateOutOfRange(_))
        ));
        assert!(matches!(
            parse_occurred_on("+10000-01-01T00:00:00Z"),
            Err(ReconcileError::DateOutOfRange(_) | ReconcileError::InvalidDate(_))
        ));
        assert!(parse_occurred_on("1000-01-01").is_ok());
        assert!(parse_occurred_on("9999-12-31T23:59:59Z").is_ok());

        let ancient = Utc.with_ymd_and_hms(900, 6, 1, 0, 0, 0).unwrap();
        let result = Transaction::new("EMP001", TransactionKind::Deposit, dec!(1), ancient);
        assert!(matches!(result, Err(ReconcileError::DateOutOfRange(_))));
    }

    #[test]
    fn test_sub_millisecond_precision_dropped() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        let tx = Transaction::new("EMP001", TransactionKind::Deposit, dec!(1), at).unwrap();
        assert_eq!(tx.occurred_on.timestamp_subsec_nanos(), 1_000_000);
    }

    #[test]
    fn test_parse_occurred_on() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_occurred_on("2024-01-15").unwrap(), midnight);
        assert_eq!(parse_occurred_on("2024-01-15T00:00:00Z").unwrap(), midnight);
        assert_eq!(parse_occurred_on("2024-01-15T00:00:00").unwrap(), midnight);

        // Offsets are normalized to UTC before the day is taken.
        let shifted = parse_occurred_on("2024-01-15T02:00:00+05:30").unwrap();
        assert_eq!(shifted.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());

        assert!(matches!(
            parse_occurred_on("15/01/2024"),
            Err(ReconcileError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_wire_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let tx = Transaction::new("EMP001", TransactionKind::Collection, dec!(500.25), at).unwrap();
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["employeeId"], "EMP001");
        assert_eq!(json["kind"], "collection");
        assert_eq!(json["amount"], "500.25");
        assert!(json.get("id").is_none());
    }
}
