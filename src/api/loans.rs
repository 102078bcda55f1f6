//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanQuery, UpdateLoan},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List loans with filters and pagination
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = PaginatedResponse<Loan>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<Loan>>> {
    let (loans, total) = state.services.loans.list_loans(&query).await?;
    Ok(Json(PaginatedResponse::new(loans, total, query.pagination())))
}

/// Get loan by code
#[utoipa::path(
    get,
    path = "/loans/{code}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("code" = String, Path, description = "Loan code")
    ),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_loan(&code).await?;
    Ok(Json(loan))
}

/// Lend a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already on loan", body = crate::error::ErrorResponse),
        (status = 500, description = "Loan saved but book not updated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(loan): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    loan.validate()?;

    tracing::debug!(user = %claims.username, book = %loan.book_code, "Creating loan");
    let created = state.services.loans.add_loan(loan).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a loan, returning or re-borrowing its book
#[utoipa::path(
    put,
    path = "/loans/{code}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("code" = String, Path, description = "Loan code")
    ),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 404, description = "Loan or book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already on loan", body = crate::error::ErrorResponse),
        (status = 500, description = "Loan saved but book not updated", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
    Json(update): Json<UpdateLoan>,
) -> AppResult<Json<Loan>> {
    update.validate()?;

    let existing = state.services.loans.get_loan(&code).await?;
    tracing::debug!(user = %claims.username, loan = %code, status = %update.status, "Updating loan");
    let updated = state.services.loans.update_loan(existing, update).await?;
    Ok(Json(updated))
}

/// Delete a loan record. The book's availability is not changed.
#[utoipa::path(
    delete,
    path = "/loans/{code}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("code" = String, Path, description = "Loan code")
    ),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 403, description = "Administrator role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.loans.delete_loan(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
