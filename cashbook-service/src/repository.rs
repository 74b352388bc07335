//! Cashbook repository
//!
//! Storage seam for employees and transactions.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use error::DatabaseError;
use parking_lot::RwLock;
use thiserror::Error;

use crate::models::{Employee, Transaction};

/// Repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Employee already exists: {0}")]
    DuplicateEmployee(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Storage for employees and their transactions.
///
/// Transactions are append-only; there is no update or delete.
#[async_trait]
pub trait CashbookRepository: Send + Sync {
    /// All employees in insertion order
    async fn list_employees(&self) -> Result<Vec<Employee>, RepositoryError>;

    /// Find an employee by business ID
    async fn find_employee(&self, employee_id: &str) -> Result<Option<Employee>, RepositoryError>;

    /// Add an employee; the ID must be new
    async fn insert_employee(&self, employee: &Employee) -> Result<Employee, RepositoryError>;

    /// Append a transaction, returning it with its storage ID and timestamp
    async fn insert_transaction(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError>;

    /// Snapshot of every transaction owned by `employee_id`, oldest first
    async fn transactions_for(&self, employee_id: &str) -> Result<Vec<Transaction>, RepositoryError>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<(), RepositoryError>;

    /// Short name of the backing store, for diagnostics
    fn backend(&self) -> &'static str;
}

/// In-memory repository for testing and development
pub struct InMemoryRepository {
    employees: RwLock<Vec<Employee>>,
    transactions: RwLock<Vec<Transaction>>,
    next_id: AtomicI64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            employees: RwLock::new(Vec::new()),
            transactions: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CashbookRepository for InMemoryRepository {
    async fn list_employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self.employees.read().clone())
    }

    async fn find_employee(&self, employee_id: &str) -> Result<Option<Employee>, RepositoryError> {
        Ok(self
            .employees
            .read()
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<Employee, RepositoryError> {
        let mut employees = self.employees.write();
        if employees.iter().any(|e| e.employee_id == employee.employee_id) {
            return Err(RepositoryError::DuplicateEmployee(employee.employee_id.clone()));
        }
        employees.push(employee.clone());
        Ok(employee.clone())
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError> {
        let mut stored = transaction.clone();
        stored.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
        stored.recorded_at = Some(chrono::Utc::now());

        self.transactions.write().push(stored.clone());
        Ok(stored)
    }

    async fn transactions_for(&self, employee_id: &str) -> Result<Vec<Transaction>, RepositoryError> {
        let mut owned: Vec<Transaction> = self
            .transactions
            .read()
            .iter()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect();
        owned.sort_by_key(|t| (t.occurred_on, t.id));
        Ok(owned)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
