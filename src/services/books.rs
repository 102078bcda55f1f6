//! Book catalog service

use std::sync::Arc;

use crate::{
    codes,
    error::AppResult,
    models::book::{Book, BookQuery, BookStatus, CreateBook, NewBook, UpdateBook},
    repository::BookStore,
};

use super::locks::{book_key, genre_key, KeyedLocks};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BookStore>,
    locks: KeyedLocks,
    institute: String,
}

impl BooksService {
    pub fn new(books: Arc<dyn BookStore>, locks: KeyedLocks, institute: impl Into<String>) -> Self {
        Self {
            books,
            locks,
            institute: institute.into(),
        }
    }

    /// Add a book to the catalog under the next code of its genre.
    /// New books are always available.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let _genre_guard = self.locks.lock(genre_key(&book.genre)).await;

        let last = self.books.get_last(&book.genre).await?;
        let code = codes::next_code(
            &self.institute,
            &book.genre,
            last.as_ref().map(|b| b.code.as_str()),
        )?;

        let created = self
            .books
            .create(&NewBook {
                code,
                title: book.title,
                genre: book.genre,
                author: book.author,
                publisher: book.publisher,
                publication_year: book.publication_year.unwrap_or_default(),
                status: BookStatus::Available,
            })
            .await?;

        tracing::info!(book = %created.code, "Book created");
        Ok(created)
    }

    /// Replace the descriptive fields of a book
    pub async fn update_book(&self, code: &str, update: UpdateBook) -> AppResult<Book> {
        let _book_guard = self.locks.lock(book_key(code)).await;

        let existing = self.books.get_by_code(code).await?;
        let updated = self
            .books
            .update(&Book {
                title: update.title,
                author: update.author,
                publisher: update.publisher,
                publication_year: update
                    .publication_year
                    .unwrap_or_else(|| existing.publication_year.clone()),
                ..existing
            })
            .await?;

        tracing::info!(book = %updated.code, "Book updated");
        Ok(updated)
    }

    pub async fn delete_book(&self, code: &str) -> AppResult<()> {
        let _book_guard = self.locks.lock(book_key(code)).await;
        self.books.delete(code).await?;
        tracing::info!(book = %code, "Book deleted");
        Ok(())
    }

    pub async fn get_book(&self, code: &str) -> AppResult<Book> {
        self.books.get_by_code(code).await
    }

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.books.list(query).await
    }
}
