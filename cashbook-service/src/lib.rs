//! Cashbook Service
//!
//! Tracks field collections and bank deposits per employee and reconciles
//! the outstanding balance.
//!
//! The reconciliation core ([`summarize`] and [`LedgerBuilder`]) is pure and
//! synchronous; [`CashbookService`] feeds it snapshots from a
//! [`CashbookRepository`].

pub mod aggregator;
pub mod ledger;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

pub use aggregator::summarize;
pub use ledger::{build_ledger, CarryPolicy, LedgerBuilder};
pub use models::{
    parse_occurred_on, Employee, LedgerRow, OutstandingSummary, ReconcileError, Transaction,
    TransactionKind,
};
pub use mysql::MySqlRepository;
pub use repository::{CashbookRepository, InMemoryRepository, RepositoryError};
pub use service::{CashbookService, ServiceError, DEFAULT_EMPLOYEES};
