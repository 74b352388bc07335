//! Day-by-day running-balance ledger.
//!
//! Transactions are grouped by UTC calendar day. Walking the days in order, a
//! day's deposits first pay down the balance carried from earlier days; only
//! what is left over counts as the day's own deposit. The running balance
//! after each day is reported as the row's `difference`.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Employee, LedgerRow, ReconcileError, Transaction, TransactionKind};

/// What happens to deposits that exceed everything still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryPolicy {
    /// The running balance goes negative and the credit offsets later collections.
    #[default]
    AllowCredit,
    /// The excess is dropped; the running balance never goes below zero.
    ClampAtZero,
}

impl FromStr for CarryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" | "allow_credit" => Ok(CarryPolicy::AllowCredit),
            "clamp" | "clamp_at_zero" => Ok(CarryPolicy::ClampAtZero),
            other => Err(format!("unknown carry policy '{}', expected 'credit' or 'clamp'", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct DayTotals {
    collections: Decimal,
    deposits: Decimal,
}

/// How one day's deposits were split against the carried balance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Allocation {
    applied: Decimal,
    excess: Decimal,
}

/// Builds ledgers under a fixed [`CarryPolicy`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerBuilder {
    policy: CarryPolicy,
}

impl LedgerBuilder {
    pub fn new(policy: CarryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CarryPolicy {
        self.policy
    }

    /// Build the ledger for `employee`, one row per distinct day, ascending.
    pub fn build(
        &self,
        employee: &Employee,
        transactions: &[Transaction],
    ) -> Result<Vec<LedgerRow>, ReconcileError> {
        let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
        for tx in transactions {
            tx.validate_for(&employee.employee_id)?;

            let totals = days.entry(tx.occurred_date()).or_default();
            let total = match tx.kind {
                TransactionKind::Collection => &mut totals.collections,
                TransactionKind::Deposit => &mut totals.deposits,
            };
            *total = checked(total.checked_add(tx.amount))?;
        }

        let mut carried = Decimal::ZERO;
        days.into_iter()
            .map(|(date, totals)| {
                let allocation = self.carry_over(&mut carried, totals)?;
                Ok(LedgerRow {
                    date,
                    employee_name: employee.name.clone(),
                    employee_id: employee.employee_id.clone(),
                    collection_amount: totals.collections,
                    deposit_amount: totals.deposits,
                    applied_deposit: allocation.applied,
                    excess_deposit: allocation.excess,
                    daily_difference: checked(totals.collections.checked_sub(totals.deposits))?,
                    difference: carried,
                })
            })
            .collect()
    }

    /// Apply one day to the carried balance.
    fn carry_over(&self, carried: &mut Decimal, day: DayTotals) -> Result<Allocation, ReconcileError> {
        // Both operands are non-negative here, so these cannot overflow.
        let excess = if *carried > Decimal::ZERO {
            let excess = (day.deposits - *carried).max(Decimal::ZERO);
            *carried = (*carried - day.deposits).max(Decimal::ZERO);
            excess
        } else {
            day.deposits
        };

        let delta = checked(day.collections.checked_sub(excess))?;
        *carried = checked(carried.checked_add(delta))?;

        if self.policy == CarryPolicy::ClampAtZero && *carried < Decimal::ZERO {
            *carried = Decimal::ZERO;
        }

        Ok(Allocation {
            applied: day.deposits - excess,
            excess,
        })
    }
}

fn checked(sum: Option<Decimal>) -> Result<Decimal, ReconcileError> {
    sum.ok_or(ReconcileError::AmountOverflow)
}

/// Build a ledger with the default [`CarryPolicy::AllowCredit`].
pub fn build_ledger(
    employee: &Employee,
    transactions: &[Transaction],
) -> Result<Vec<LedgerRow>, ReconcileError> {
    LedgerBuilder::default().build(employee, transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::summarize;
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal_macros::dec;

    const POLICIES: [CarryPolicy; 2] = [CarryPolicy::AllowCredit, CarryPolicy::ClampAtZero];

    fn mayank() -> Employee {
        Employee::new("EMP001", "Mayank")
    }

    fn tx(kind: TransactionKind, amount: Decimal, day: u32, hour: u32) -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
        Transaction::new("EMP001", kind, amount, at).unwrap()
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            tx(TransactionKind::Collection, dec!(500), 1, 9),
            tx(TransactionKind::Deposit, dec!(300), 2, 9),
            tx(TransactionKind::Deposit, dec!(300), 3, 9),
        ]
    }

    #[test]
    fn test_empty_history() {
        for policy in POLICIES {
            let rows = LedgerBuilder::new(policy).build(&mayank(), &[]).unwrap();
            assert!(rows.is_empty());
        }
    }

    #[test]
    fn test_oldest_debt_first_scenario() {
        for (policy, final_balance, final_excess) in [
            (CarryPolicy::AllowCredit, dec!(-100), dec!(100)),
            (CarryPolicy::ClampAtZero, dec!(0), dec!(100)),
        ] {
            let rows = LedgerBuilder::new(policy).build(&mayank(), &scenario()).unwrap();
            assert_eq!(rows.len(), 3, "{:?}", policy);

            assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
            assert_eq!(rows[0].collection_amount, dec!(500));
            assert_eq!(rows[0].deposit_amount, dec!(0));
            assert_eq!(rows[0].difference, dec!(500));

            assert_eq!(rows[1].deposit_amount, dec!(300));
            assert_eq!(rows[1].applied_deposit, dec!(300));
            assert_eq!(rows[1].excess_deposit, dec!(0));
            assert_eq!(rows[1].difference, dec!(200));

            assert_eq!(rows[2].deposit_amount, dec!(300));
            assert_eq!(rows[2].applied_deposit, dec!(200));
            assert_eq!(rows[2].excess_deposit, final_excess);
            assert_eq!(rows[2].daily_difference, dec!(-300));
            assert_eq!(rows[2].difference, final_balance, "{:?}", policy);

            assert!(rows.iter().all(|r| r.employee_name == "Mayank" && r.employee_id == "EMP001"));
        }
    }

    #[test]
    fn test_same_day_entries_are_summed() {
        let history = vec![
            tx(TransactionKind::Collection, dec!(100), 4, 8),
            tx(TransactionKind::Deposit, dec!(40), 4, 12),
            tx(TransactionKind::Collection, dec!(25.5), 4, 18),
        ];
        let rows = build_ledger(&mayank(), &history).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].collection_amount, dec!(125.5));
        assert_eq!(rows[0].deposit_amount, dec!(40));
        // Nothing was carried into the day, so the deposit is all excess.
        assert_eq!(rows[0].applied_deposit, dec!(0));
        assert_eq!(rows[0].excess_deposit, dec!(40));
        assert_eq!(rows[0].difference, dec!(85.5));
        assert_eq!(rows[0].daily_difference, dec!(85.5));
    }

    #[test]
    fn test_advance_deposit_without_carry() {
        let history = vec![
            tx(TransactionKind::Deposit, dec!(50), 1, 9),
            tx(TransactionKind::Collection, dec!(80), 2, 9),
        ];

        let credit = LedgerBuilder::new(CarryPolicy::AllowCredit)
            .build(&mayank(), &history)
            .unwrap();
        assert_eq!(credit[0].excess_deposit, dec!(50));
        assert_eq!(credit[0].difference, dec!(-50));
        // The credit absorbs part of the next collection.
        assert_eq!(credit[1].difference, dec!(30));

        let clamped = LedgerBuilder::new(CarryPolicy::ClampAtZero)
            .build(&mayank(), &history)
            .unwrap();
        assert_eq!(clamped[0].difference, dec!(0));
        assert_eq!(clamped[1].difference, dec!(80));
    }

    #[test]
    fn test_days_use_utc_calendar() {
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap();
        let early = late + Duration::seconds(2);
        let history = vec![
            Transaction::new("EMP001", TransactionKind::Collection, dec!(1), early).unwrap(),
            Transaction::new("EMP001", TransactionKind::Collection, dec!(1), late).unwrap(),
        ];

        let rows = build_ledger(&mayank(), &history).unwrap();
        let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
    }

    #[test]
    fn test_foreign_transaction_rejected() {
        let mut history = scenario();
        history[1].employee_id = "EMP002".to_string();

        let result = build_ledger(&mayank(), &history);
        assert!(matches!(result, Err(ReconcileError::ForeignTransaction { .. })));
    }

    #[test]
    fn test_overflowing_day_total_is_rejected() {
        let mut history = vec![
            tx(TransactionKind::Collection, dec!(1), 1, 9),
            tx(TransactionKind::Collection, dec!(1), 1, 10),
        ];
        for t in &mut history {
            t.amount = Decimal::MAX;
        }

        for policy in POLICIES {
            let result = LedgerBuilder::new(policy).build(&mayank(), &history);
            assert_eq!(result, Err(ReconcileError::AmountOverflow), "{:?}", policy);
        }
    }

    #[test]
    fn test_overflowing_running_balance_is_rejected() {
        let mut history = vec![
            tx(TransactionKind::Collection, dec!(1), 1, 9),
            tx(TransactionKind::Collection, dec!(1), 2, 9),
        ];
        for t in &mut history {
            t.amount = Decimal::MAX;
        }

        let result = build_ledger(&mayank(), &history);
        assert_eq!(result, Err(ReconcileError::AmountOverflow));
    }

    #[test]
    fn test_carry_policy_from_str() {
        assert_eq!("credit".parse::<CarryPolicy>(), Ok(CarryPolicy::AllowCredit));
        assert_eq!(" Clamp ".parse::<CarryPolicy>(), Ok(CarryPolicy::ClampAtZero));
        assert!("discard".parse::<CarryPolicy>().is_err());
    }

    fn random_history(rng: &mut StdRng) -> Vec<Transaction> {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let len = rng.random_range(0..60usize);
        let span_days = rng.random_range(1..20i64);

        (0..len)
            .map(|_| {
                let kind = if rng.random_bool(0.55) {
                    TransactionKind::Collection
                } else {
                    TransactionKind::Deposit
                };
                let cents = rng.random_range(0..250_000i64);
                let at = start
                    + Duration::days(rng.random_range(0..span_days))
                    + Duration::minutes(rng.random_range(0..1440i64));
                Transaction::new("EMP001", kind, Decimal::new(cents, 2), at).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_randomized_cross_check() {
        for seed in 0..12u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let history = random_history(&mut rng);

            let summary = summarize(&mayank(), &history).unwrap();
            let rows = build_ledger(&mayank(), &history).unwrap();

            // Conservation
            let last = rows.last().map(|r| r.difference).unwrap_or(Decimal::ZERO);
            assert_eq!(last, summary.difference, "seed {}", seed);

            // Strictly increasing dates
            assert!(rows.windows(2).all(|w| w[0].date < w[1].date), "seed {}", seed);

            // Rows account for every amount exactly once
            let collected: Decimal = rows.iter().map(|r| r.collection_amount).sum();
            let deposited: Decimal = rows.iter().map(|r| r.deposit_amount).sum();
            assert_eq!(collected, summary.net_collection);
            assert_eq!(deposited, summary.total_deposit);

            for row in &rows {
                assert_eq!(row.applied_deposit + row.excess_deposit, row.deposit_amount);
            }

            // Determinism
            assert_eq!(rows, build_ledger(&mayank(), &history).unwrap());
            assert_eq!(summary, summarize(&mayank(), &history).unwrap());
        }
    }

    #[test]
    fn test_randomized_clamp_never_negative() {
        for seed in 100..110u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let history = random_history(&mut rng);

            let rows = LedgerBuilder::new(CarryPolicy::ClampAtZero)
                .build(&mayank(), &history)
                .unwrap();
            assert!(rows.iter().all(|r| r.difference >= Decimal::ZERO), "seed {}", seed);
        }
    }
}
