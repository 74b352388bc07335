//! Cashbook service
//!
//! Business operations over a [`CashbookRepository`]. Every report is
//! recomputed from a single snapshot of the employee's transactions.

use std::sync::Arc;

use error::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::aggregator::summarize;
use crate::ledger::{CarryPolicy, LedgerBuilder};
use crate::models::{
    parse_occurred_on, Employee, LedgerRow, OutstandingSummary, ReconcileError, Transaction,
    TransactionKind,
};
use crate::repository::{CashbookRepository, InMemoryRepository, RepositoryError};

/// Roster inserted by [`CashbookService::seed_default_employees`].
pub const DEFAULT_EMPLOYEES: [(&str, &str); 5] = [
    ("EMP001", "Mayank"),
    ("EMP002", "Rohit"),
    ("EMP003", "Sneha"),
    ("EMP004", "Anjali"),
    ("EMP005", "Vikram"),
];

/// Service errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Invalid employee: {0}")]
    InvalidEmployee(String),

    #[error(transparent)]
    Invalid(#[from] ReconcileError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmployeeNotFound(_) => AppError::NotFound(err.to_string()),
            ServiceError::InvalidEmployee(_) | ServiceError::Invalid(_) => {
                AppError::Invalid(err.to_string())
            }
            ServiceError::Repository(RepositoryError::DuplicateEmployee(id)) => {
                AppError::Invalid(format!("Employee already exists: {}", id))
            }
            ServiceError::Repository(RepositoryError::Database(e)) => AppError::Database(e),
        }
    }
}

/// Cashbook service for business operations
#[derive(Clone)]
pub struct CashbookService {
    repository: Arc<dyn CashbookRepository>,
    ledger: LedgerBuilder,
}

impl CashbookService {
    /// Create a service over `repository` with the default carry policy.
    pub fn new(repository: Arc<dyn CashbookRepository>) -> Self {
        Self {
            repository,
            ledger: LedgerBuilder::default(),
        }
    }

    /// Create a service with an empty in-memory repository
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    /// Use `policy` for ledger reports.
    pub fn with_carry_policy(mut self, policy: CarryPolicy) -> Self {
        self.ledger = LedgerBuilder::new(policy);
        self
    }

    pub fn carry_policy(&self) -> CarryPolicy {
        self.ledger.policy()
    }

    /// Name of the storage backend.
    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }

    pub async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(self.repository.health_check().await?)
    }

    /// List all employees
    pub async fn list_employees(&self) -> Result<Vec<Employee>, ServiceError> {
        Ok(self.repository.list_employees().await?)
    }

    /// Add a single employee
    pub async fn add_employee(&self, employee_id: &str, name: &str) -> Result<Employee, ServiceError> {
        let employee_id = employee_id.trim();
        let name = name.trim();
        if employee_id.is_empty() || name.is_empty() {
            return Err(ServiceError::InvalidEmployee(
                "employee ID and name must not be blank".to_string(),
            ));
        }

        let employee = self
            .repository
            .insert_employee(&Employee::new(employee_id, name))
            .await?;
        tracing::info!("Added employee {} ({})", employee.employee_id, employee.name);
        Ok(employee)
    }

    /// Insert the default roster when no employee exists yet.
    ///
    /// Returns the roster as stored afterwards.
    pub async fn seed_default_employees(&self) -> Result<Vec<Employee>, ServiceError> {
        if !self.repository.list_employees().await?.is_empty() {
            tracing::info!("Employees already present, skipping seed");
            return self.list_employees().await;
        }

        for (employee_id, name) in DEFAULT_EMPLOYEES {
            match self.repository.insert_employee(&Employee::new(employee_id, name)).await {
                // Another request seeded concurrently.
                Ok(_) | Err(RepositoryError::DuplicateEmployee(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!("Seeded {} employees", DEFAULT_EMPLOYEES.len());
        self.list_employees().await
    }

    async fn require_employee(&self, employee_id: &str) -> Result<Employee, ServiceError> {
        self.repository
            .find_employee(employee_id)
            .await?
            .ok_or_else(|| ServiceError::EmployeeNotFound(employee_id.to_string()))
    }

    /// Validate and record a collection or deposit.
    pub async fn record_transaction(
        &self,
        employee_id: &str,
        kind: &str,
        amount: Decimal,
        occurred_on: &str,
    ) -> Result<Transaction, ServiceError> {
        let kind: TransactionKind = kind.parse()?;
        let occurred_on = parse_occurred_on(occurred_on)?;
        let transaction = Transaction::new(employee_id, kind, amount, occurred_on)?;

        self.require_employee(employee_id).await?;

        let stored = self.repository.insert_transaction(&transaction).await?;
        tracing::info!(
            "Recorded {} of {} for {} on {}",
            stored.kind,
            stored.amount,
            stored.employee_id,
            stored.occurred_date()
        );
        Ok(stored)
    }

    /// Outstanding summary for a single employee
    pub async fn employee_summary(&self, employee_id: &str) -> Result<OutstandingSummary, ServiceError> {
        let employee = self.require_employee(employee_id).await?;
        let snapshot = self.repository.transactions_for(&employee.employee_id).await?;
        Ok(summarize(&employee, &snapshot)?)
    }

    /// Outstanding summary of every employee, in roster order
    pub async fn outstanding_report(&self) -> Result<Vec<OutstandingSummary>, ServiceError> {
        let employees = self.repository.list_employees().await?;
        let mut report = Vec::with_capacity(employees.len());

        for employee in &employees {
            let snapshot = self.repository.transactions_for(&employee.employee_id).await?;
            report.push(summarize(employee, &snapshot)?);
        }

        tracing::debug!("Computed outstanding report for {} employees", report.len());
        Ok(report)
    }

    /// Day-by-day ledger for one employee
    pub async fn ledger_report(&self, employee_id: &str) -> Result<Vec<LedgerRow>, ServiceError> {
        let employee = self.require_employee(employee_id).await?;
        let snapshot = self.repository.transactions_for(&employee.employee_id).await?;
        let rows = self.ledger.build(&employee, &snapshot)?;

        tracing::debug!(
            "Built ledger for {}: {} transactions over {} days",
            employee.employee_id,
            snapshot.len(),
            rows.len()
        );
        Ok(rows)
    }
}

impl Default for CashbookService {
    fn default() -> Self {
        Self::in_memory()
    }
}
