//! MySQL-backed repository.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use db::{DbConfig, DbPool};
use error::DatabaseError;
use rust_decimal::Decimal;

use crate::models::{Employee, Transaction, TransactionKind};
use crate::repository::{CashbookRepository, RepositoryError};

const CREATE_EMPLOYEES: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    employee_id VARCHAR(64) NOT NULL,
    name VARCHAR(255) NOT NULL,
    UNIQUE KEY uq_employees_employee_id (employee_id)
)"#;

const CREATE_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    employee_id VARCHAR(64) NOT NULL,
    kind VARCHAR(16) NOT NULL,
    amount DECIMAL(19, 4) NOT NULL,
    occurred_on DATETIME(3) NOT NULL,
    recorded_at DATETIME(3) NOT NULL,
    KEY ix_transactions_employee (employee_id, occurred_on),
    CONSTRAINT fk_transactions_employee FOREIGN KEY (employee_id)
        REFERENCES employees (employee_id)
)"#;

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    employee_id: String,
    kind: String,
    amount: Decimal,
    occurred_on: NaiveDateTime,
    recorded_at: NaiveDateTime,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind: TransactionKind = row.kind.parse().map_err(|_| {
            tracing::error!("Transaction {} has unknown kind '{}'", row.id, row.kind);
            DatabaseError::QueryFailed(format!("corrupt kind in transaction {}", row.id))
        })?;

        Ok(Transaction {
            id: Some(row.id),
            employee_id: row.employee_id,
            kind,
            amount: row.amount,
            occurred_on: row.occurred_on.and_utc(),
            recorded_at: Some(row.recorded_at.and_utc()),
        })
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    tracing::error!("Query failed: {}", e);
    DatabaseError::QueryFailed(e.to_string()).into()
}

/// Repository over the `employees` and `transactions` tables.
#[derive(Clone)]
pub struct MySqlRepository {
    pool: DbPool,
}

impl MySqlRepository {
    /// Wrap an existing pool. Call [`MySqlRepository::migrate`] before first use.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the pool and make sure the schema exists.
    pub async fn connect(config: &DbConfig) -> Result<Self, RepositoryError> {
        let pool = db::create_pool(config).await?;
        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Create tables that do not exist yet.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        for statement in [CREATE_EMPLOYEES, CREATE_TRANSACTIONS] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(query_failed)?;
        }
        tracing::info!("Database schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        db::close_pool(&self.pool).await;
    }
}

#[async_trait]
impl CashbookRepository for MySqlRepository {
    async fn list_employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT employee_id, name FROM employees ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(query_failed)?;

        Ok(rows
            .into_iter()
            .map(|(employee_id, name)| Employee { employee_id, name })
            .collect())
    }

    async fn find_employee(&self, employee_id: &str) -> Result<Option<Employee>, RepositoryError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT employee_id, name FROM employees WHERE employee_id = ?")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?;

        Ok(row.map(|(employee_id, name)| Employee { employee_id, name }))
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<Employee, RepositoryError> {
        let result = sqlx::query("INSERT INTO employees (employee_id, name) VALUES (?, ?)")
            .bind(&employee.employee_id)
            .bind(&employee.name)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(employee.clone()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(RepositoryError::DuplicateEmployee(employee.employee_id.clone()))
            }
            Err(e) => Err(query_failed(e)),
        }
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError> {
        let recorded_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO transactions (employee_id, kind, amount, occurred_on, recorded_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&transaction.employee_id)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(transaction.occurred_on.naive_utc())
        .bind(recorded_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        let mut stored = transaction.clone();
        stored.id = Some(result.last_insert_id() as i64);
        stored.recorded_at = Some(recorded_at);
        Ok(stored)
    }

    async fn transactions_for(&self, employee_id: &str) -> Result<Vec<Transaction>, RepositoryError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            "SELECT id, employee_id, kind, amount, occurred_on, recorded_at \
             FROM transactions WHERE employee_id = ? ORDER BY occurred_on, id",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        db::health_check(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mysql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let row = TransactionRow {
            id: 7,
            employee_id: "EMP001".to_string(),
            kind: "deposit".to_string(),
            amount: dec!(250.5000),
            occurred_on: at,
            recorded_at: at,
        };

        let tx = Transaction::try_from(row).unwrap();
        assert_eq!(tx.id, Some(7));
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount, dec!(250.5));
        assert_eq!(tx.occurred_on, at.and_utc());
    }

    #[test]
    fn test_corrupt_kind_is_a_database_error() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let row = TransactionRow {
            id: 8,
            employee_id: "EMP001".to_string(),
            kind: "refund".to_string(),
            amount: dec!(1),
            occurred_on: at,
            recorded_at: at,
        };

        let result = Transaction::try_from(row);
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
