//! Business logic services

pub mod books;
pub mod loans;
pub mod locks;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository. Book and loan services
    /// share one lock table so they serialize on the same books.
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let locks = locks::KeyedLocks::new();
        let books = Arc::new(repository.books.clone());
        let loans = Arc::new(repository.loans.clone());

        Self {
            books: books::BooksService::new(books.clone(), locks.clone(), &config.codes.institute),
            loans: loans::LoansService::new(books, loans, locks, &config.codes.loan_prefix),
            users: users::UsersService::new(repository.users.clone(), config.auth.clone()),
            repository,
        }
    }

    /// Check that the backing database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
