//! Loan lifecycle service
//!
//! Coordinates the loan store and the book store. A book is `NOT_AVAILABLE`
//! exactly while one `BORROWED` loan references it. The two stores are
//! written one after the other without a shared transaction: the loan is
//! written first, then the book. When the book write does not happen the
//! loan is kept, the caller gets [`AppError::PartialWrite`] and the window
//! is logged under the `lending_server::consistency` target.

use std::sync::Arc;

use crate::{
    codes,
    error::{AppError, AppResult},
    models::{
        book::BookStatus,
        loan::{CreateLoan, Loan, LoanQuery, LoanStatus, NewLoan, UpdateLoan},
    },
    repository::{BookStore, LoanStore},
};

use super::locks::{book_key, borrower_key, KeyedLocks};

const CONSISTENCY: &str = "lending_server::consistency";

/// Book status a loan moving from `previous` to `next` implies, `None` when
/// the move does not change who holds the book
pub fn availability_change(previous: &LoanStatus, next: &LoanStatus) -> Option<BookStatus> {
    match (previous, next) {
        (LoanStatus::Borrowed, LoanStatus::Returned) => Some(BookStatus::Available),
        (LoanStatus::Borrowed, _) => None,
        (_, LoanStatus::Borrowed) => Some(BookStatus::NotAvailable),
        _ => None,
    }
}

/// Open between the loan write and the book write. Dropping it while still
/// open means the operation was abandoned in between.
struct ConsistencyWindow {
    loan_code: String,
    book_code: String,
    open: bool,
}

impl ConsistencyWindow {
    fn open(loan_code: &str, book_code: &str) -> Self {
        Self {
            loan_code: loan_code.to_string(),
            book_code: book_code.to_string(),
            open: true,
        }
    }

    fn close(mut self) {
        self.open = false;
    }

    fn fail(mut self, source: AppError) -> AppError {
        self.open = false;
        tracing::error!(
            target: CONSISTENCY,
            loan = %self.loan_code,
            book = %self.book_code,
            error = %source,
            "Loan persisted but book availability was not updated"
        );
        AppError::PartialWrite {
            completed: format!("loan {}", self.loan_code),
            pending: format!("book {}", self.book_code),
            source: Box::new(source),
        }
    }
}

impl Drop for ConsistencyWindow {
    fn drop(&mut self) {
        if self.open {
            tracing::error!(
                target: CONSISTENCY,
                loan = %self.loan_code,
                book = %self.book_code,
                "Operation abandoned after the loan write, book availability not updated"
            );
        }
    }
}

#[derive(Clone)]
pub struct LoansService {
    books: Arc<dyn BookStore>,
    loans: Arc<dyn LoanStore>,
    locks: KeyedLocks,
    loan_prefix: String,
}

impl LoansService {
    pub fn new(
        books: Arc<dyn BookStore>,
        loans: Arc<dyn LoanStore>,
        locks: KeyedLocks,
        loan_prefix: impl Into<String>,
    ) -> Self {
        Self {
            books,
            loans,
            locks,
            loan_prefix: loan_prefix.into(),
        }
    }

    /// Lend a book: issue a loan code, persist a `BORROWED` loan, then mark
    /// the book `NOT_AVAILABLE`
    pub async fn add_loan(&self, intent: CreateLoan) -> AppResult<Loan> {
        if let Some(ref requested) = intent.status {
            if *requested != LoanStatus::Borrowed {
                tracing::debug!("Ignoring client status {} on new loan", requested);
            }
        }

        let _borrower_guard = self.locks.lock(borrower_key(&intent.borrower)).await;

        let last = self.loans.get_last(&intent.borrower).await?;
        let code = codes::next_code(
            &self.loan_prefix,
            &intent.borrower,
            last.as_ref().map(|l| l.code.as_str()),
        )?;

        let _book_guard = self.locks.lock(book_key(&intent.book_code)).await;

        let book = self.books.get_by_code(&intent.book_code).await?;
        if book.status == BookStatus::NotAvailable {
            return Err(AppError::Conflict(format!("Book {} is already on loan", book.code)));
        }

        let loan = self
            .loans
            .create(&NewLoan {
                code,
                book_code: book.code.clone(),
                title: book.title.clone(),
                borrower: intent.borrower,
                loan_start_date: intent.loan_start_date,
                loan_end_date: intent.loan_end_date,
                status: LoanStatus::Borrowed,
            })
            .await?;

        let window = ConsistencyWindow::open(&loan.code, &book.code);
        match self
            .books
            .update_status(&book.code, book.status, BookStatus::NotAvailable)
            .await
        {
            Ok(_) => {
                window.close();
                tracing::info!(loan = %loan.code, book = %book.code, "Loan created");
                Ok(loan)
            }
            Err(e) => Err(window.fail(e)),
        }
    }

    /// Update a loan's dates and status and move the book when the status
    /// change hands it back or takes it out again. The loan is re-read under
    /// the book lock, `existing` only names it.
    pub async fn update_loan(&self, existing: Loan, intent: UpdateLoan) -> AppResult<Loan> {
        let _book_guard = self.locks.lock(book_key(&existing.book_code)).await;

        let book = self.books.get_by_code(&existing.book_code).await?;
        let current = self.loans.get_by_code(&existing.code).await?;
        let target = availability_change(&current.status, &intent.status);

        // A returned loan cannot take back a book someone else holds
        if target == Some(BookStatus::NotAvailable)
            && current.status == LoanStatus::Returned
            && book.status == BookStatus::NotAvailable
        {
            return Err(AppError::Conflict(format!("Book {} is already on loan", book.code)));
        }

        let previous = current.status.clone();
        let loan = self
            .loans
            .update(&Loan {
                loan_start_date: intent.loan_start_date,
                loan_end_date: intent.loan_end_date,
                status: intent.status,
                ..current
            })
            .await?;

        let target = match target {
            Some(target) if target != book.status => target,
            _ => {
                if let LoanStatus::Other(_) = loan.status {
                    tracing::warn!(
                        loan = %loan.code,
                        status = %loan.status,
                        "Loan status does not map to a book availability, book left unchanged"
                    );
                }
                tracing::info!(loan = %loan.code, from = %previous, to = %loan.status, "Loan updated");
                return Ok(loan);
            }
        };

        let window = ConsistencyWindow::open(&loan.code, &book.code);
        match self.books.update_status(&book.code, book.status, target).await {
            Ok(_) => {
                window.close();
                tracing::info!(
                    loan = %loan.code,
                    book = %book.code,
                    from = %previous,
                    to = %loan.status,
                    "Loan updated"
                );
                Ok(loan)
            }
            Err(e) => Err(window.fail(e)),
        }
    }

    /// Delete a loan record. Book availability is left as it is.
    pub async fn delete_loan(&self, code: &str) -> AppResult<()> {
        self.loans.delete(code).await?;
        tracing::info!(loan = %code, "Loan deleted");
        Ok(())
    }

    pub async fn get_loan(&self, code: &str) -> AppResult<Loan> {
        self.loans.get_by_code(code).await
    }

    pub async fn list_loans(&self, query: &LoanQuery) -> AppResult<(Vec<Loan>, i64)> {
        self.loans.list(query).await
    }
}
