//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookStatus, NewBook},
};

/// Persisted collection of books, partitioned by genre for code issuing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Get book by code, `NotFound` when absent
    async fn get_by_code(&self, code: &str) -> AppResult<Book>;

    /// Most recently created book of a genre
    async fn get_last(&self, genre: &str) -> AppResult<Option<Book>>;

    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    /// Overwrite every mutable column of the book
    async fn update(&self, book: &Book) -> AppResult<Book>;

    /// Set the status only if it still equals `expected`, `Conflict` otherwise
    async fn update_status(
        &self,
        code: &str,
        expected: BookStatus,
        status: BookStatus,
    ) -> AppResult<Book>;

    async fn delete(&self, code: &str) -> AppResult<()>;

    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filtered(head: &str, query: &BookQuery) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(head);
        builder.push(" WHERE 1=1");

        let authors = query.authors();
        if !authors.is_empty() {
            builder.push(" AND author = ANY(").push_bind(authors).push(")");
        }

        let publishers = query.publishers();
        if !publishers.is_empty() {
            builder.push(" AND publisher = ANY(").push_bind(publishers).push(")");
        }

        if let Some(ref year) = query.publication_year {
            builder.push(" AND publication_year = ").push_bind(year.clone());
        }

        if let Some(ref genre) = query.genre {
            builder.push(" AND genre = ").push_bind(genre.clone());
        }

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }

        builder
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn get_by_code(&self, code: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", code)))
    }

    async fn get_last(&self, genre: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE genre = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(genre)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (code, title, genre, author, publisher, publication_year, status, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING *
            "#,
        )
        .bind(&book.code)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.publication_year)
        .bind(book.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, &format!("Book {}", book.code)))
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, genre = $3, author = $4, publisher = $5,
                publication_year = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.publication_year)
        .bind(book.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book.code)))
    }

    async fn update_status(
        &self,
        code: &str,
        expected: BookStatus,
        status: BookStatus,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET status = $1, updated_at = NOW()
            WHERE code = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(code)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Book {} is no longer {} or has been removed",
                code, expected
            ))
        })
    }

    async fn delete(&self, code: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", code)));
        }

        Ok(())
    }

    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let suffix = query.pagination().sql_suffix()?;

        let mut count = Self::filtered("SELECT COUNT(*) FROM books", query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = Self::filtered("SELECT * FROM books", query);
        select.push(" ORDER BY id");
        select.push(suffix);

        let books = select
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }
}
