//! Loans repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanQuery, NewLoan},
};

/// Persisted collection of loans, partitioned by borrower for code issuing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Get loan by code, `NotFound` when absent
    async fn get_by_code(&self, code: &str) -> AppResult<Loan>;

    /// Most recently created loan of a borrower
    async fn get_last(&self, borrower: &str) -> AppResult<Option<Loan>>;

    async fn create(&self, loan: &NewLoan) -> AppResult<Loan>;

    /// Overwrite every mutable column of the loan
    async fn update(&self, loan: &Loan) -> AppResult<Loan>;

    async fn delete(&self, code: &str) -> AppResult<()>;

    async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<Loan>, i64)>;
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filtered(head: &str, query: &LoanQuery) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(head);
        builder.push(" WHERE 1=1");

        if let Some(ref borrower) = query.borrower {
            builder.push(" AND borrower = ").push_bind(borrower.clone());
        }

        if let Some(ref status) = query.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }

        // Column names come from a closed enum
        if let Some((field, from, to)) = query.date_range() {
            builder
                .push(format!(" AND {} BETWEEN ", field.column()))
                .push_bind(from.to_string())
                .push(" AND ")
                .push_bind(to.to_string());
        }

        builder
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn get_by_code(&self, code: &str) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", code)))
    }

    async fn get_last(&self, borrower: &str) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE borrower = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(borrower)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn create(&self, loan: &NewLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (code, book_code, title, borrower, loan_start_date, loan_end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&loan.code)
        .bind(&loan.book_code)
        .bind(&loan.title)
        .bind(&loan.borrower)
        .bind(&loan.loan_start_date)
        .bind(&loan.loan_end_date)
        .bind(&loan.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, &format!("Loan {}", loan.code)))
    }

    async fn update(&self, loan: &Loan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET book_code = $2, title = $3, borrower = $4,
                loan_start_date = $5, loan_end_date = $6, status = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(&loan.book_code)
        .bind(&loan.title)
        .bind(&loan.borrower)
        .bind(&loan.loan_start_date)
        .bind(&loan.loan_end_date)
        .bind(&loan.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan.code)))
    }

    async fn delete(&self, code: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM loans WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loan {} not found", code)));
        }

        Ok(())
    }

    async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<Loan>, i64)> {
        let suffix = query.pagination().sql_suffix()?;

        let mut count = Self::filtered("SELECT COUNT(*) FROM loans", query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = Self::filtered("SELECT * FROM loans", query);
        select.push(" ORDER BY id");
        select.push(suffix);

        let loans = select
            .build_query_as::<Loan>()
            .fetch_all(&self.pool)
            .await?;

        Ok((loans, total))
    }
}
