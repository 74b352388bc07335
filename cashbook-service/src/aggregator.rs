//! Outstanding-balance aggregation.

use rust_decimal::Decimal;

use crate::models::{Employee, OutstandingSummary, ReconcileError, Transaction, TransactionKind};

/// Reduce one employee's full history to an [`OutstandingSummary`].
///
/// Order of `transactions` does not matter. Fails without partial output if
/// any transaction is negative or belongs to another employee.
pub fn summarize(
    employee: &Employee,
    transactions: &[Transaction],
) -> Result<OutstandingSummary, ReconcileError> {
    let mut net_collection = Decimal::ZERO;
    let mut total_deposit = Decimal::ZERO;
    let mut last_transaction_date = None;

    for tx in transactions {
        tx.validate_for(&employee.employee_id)?;

        let total = match tx.kind {
            TransactionKind::Collection => &mut net_collection,
            TransactionKind::Deposit => &mut total_deposit,
        };
        *total = total
            .checked_add(tx.amount)
            .ok_or(ReconcileError::AmountOverflow)?;
        last_transaction_date = last_transaction_date.max(Some(tx.occurred_on));
    }

    Ok(OutstandingSummary {
        employee_id: employee.employee_id.clone(),
        name: employee.name.clone(),
        net_collection,
        total_deposit,
        last_transaction_date,
        difference: net_collection
            .checked_sub(total_deposit)
            .ok_or(ReconcileError::AmountOverflow)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_AMOUNT;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn tx(kind: TransactionKind, amount: Decimal, day: u32) -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap();
        Transaction::new("EMP001", kind, amount, at).unwrap()
    }

    fn mayank() -> Employee {
        Employee::new("EMP001", "Mayank")
    }

    #[test]
    fn test_empty_history() {
        let summary = summarize(&mayank(), &[]).unwrap();

        assert_eq!(summary.employee_id, "EMP001");
        assert_eq!(summary.name, "Mayank");
        assert_eq!(summary.net_collection, Decimal::ZERO);
        assert_eq!(summary.total_deposit, Decimal::ZERO);
        assert_eq!(summary.last_transaction_date, None);
        assert_eq!(summary.difference, Decimal::ZERO);
    }

    #[test]
    fn test_over_deposit_is_negative_difference() {
        let history = vec![
            tx(TransactionKind::Collection, dec!(500), 1),
            tx(TransactionKind::Deposit, dec!(300), 2),
            tx(TransactionKind::Deposit, dec!(300), 3),
        ];

        let summary = summarize(&mayank(), &history).unwrap();
        assert_eq!(summary.net_collection, dec!(500));
        assert_eq!(summary.total_deposit, dec!(600));
        assert_eq!(summary.difference, dec!(-100));
        assert_eq!(
            summary.last_transaction_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 3, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_order_independent() {
        let mut history = vec![
            tx(TransactionKind::Deposit, dec!(10.10), 9),
            tx(TransactionKind::Collection, dec!(20.20), 2),
            tx(TransactionKind::Collection, dec!(0.05), 5),
        ];
        let forward = summarize(&mayank(), &history).unwrap();
        history.reverse();
        let backward = summarize(&mayank(), &history).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.last_transaction_date.unwrap().date_naive().to_string(), "2024-03-09");
    }

    #[test]
    fn test_no_precision_loss_on_many_small_entries() {
        let history: Vec<_> = (0..1000)
            .map(|_| tx(TransactionKind::Collection, dec!(0.10), 1))
            .collect();

        let summary = summarize(&mayank(), &history).unwrap();
        assert_eq!(summary.net_collection, dec!(100.00));
    }

    #[test]
    fn test_foreign_transaction_rejected() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let other = Transaction::new("EMP002", TransactionKind::Collection, dec!(1), at).unwrap();

        let result = summarize(&mayank(), &[tx(TransactionKind::Deposit, dec!(1), 1), other]);
        assert!(matches!(result, Err(ReconcileError::ForeignTransaction { .. })));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut bad = tx(TransactionKind::Deposit, dec!(5), 1);
        bad.amount = dec!(-5);

        let result = summarize(&mayank(), &[bad]);
        assert_eq!(result, Err(ReconcileError::NegativeAmount(dec!(-5))));
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let mut huge = vec![
            tx(TransactionKind::Collection, dec!(1), 1),
            tx(TransactionKind::Collection, dec!(1), 2),
        ];
        for t in &mut huge {
            t.amount = Decimal::MAX;
        }

        let result = summarize(&mayank(), &huge);
        assert_eq!(result, Err(ReconcileError::AmountOverflow));
    }

    #[test]
    fn test_many_maximum_amounts_still_sum() {
        let history: Vec<_> = (1..=28)
            .map(|day| tx(TransactionKind::Collection, MAX_AMOUNT, day))
            .collect();

        let summary = summarize(&mayank(), &history).unwrap();
        assert_eq!(summary.net_collection, MAX_AMOUNT * Decimal::from(28));
    }
}
