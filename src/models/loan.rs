//! Loan model and related types

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::Pagination;

/// Loan status. Values other than `BORROWED` and `RETURNED` are carried
/// through verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Other(String),
}

impl LoanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
            LoanStatus::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for LoanStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "BORROWED" => LoanStatus::Borrowed,
            "RETURNED" => LoanStatus::Returned,
            _ => LoanStatus::Other(s.to_string()),
        }
    }
}

impl From<String> for LoanStatus {
    fn from(s: String) -> Self {
        LoanStatus::from(s.as_str())
    }
}

impl From<LoanStatus> for String {
    fn from(status: LoanStatus) -> Self {
        match status {
            LoanStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

// SQLx conversion for LoanStatus (stored as TEXT)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        Ok(LoanStatus::from(s))
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    /// Human-readable code (`LOAN-alice-0001`)
    pub code: String,
    pub book_code: String,
    /// Book title at the time the loan was made
    pub title: String,
    pub borrower: String,
    pub loan_start_date: String,
    pub loan_end_date: String,
    #[schema(value_type = String, example = "BORROWED")]
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Borrowed
    }
}

/// Loan ready to be inserted (code already issued)
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub code: String,
    pub book_code: String,
    pub title: String,
    pub borrower: String,
    pub loan_start_date: String,
    pub loan_end_date: String,
    pub status: LoanStatus,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    #[validate(length(min = 1, message = "Book code is required"))]
    pub book_code: String,
    #[validate(length(min = 1, message = "Borrower is required"))]
    pub borrower: String,
    #[validate(length(min = 1, message = "Start date is required"))]
    pub loan_start_date: String,
    #[validate(length(min = 1, message = "End date is required"))]
    pub loan_end_date: String,
    /// Ignored: new loans always start as `BORROWED`
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Option<LoanStatus>,
}

/// Update loan request. Code, book and borrower of a loan never change.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLoan {
    #[validate(length(min = 1, message = "Start date is required"))]
    pub loan_start_date: String,
    #[validate(length(min = 1, message = "End date is required"))]
    pub loan_end_date: String,
    #[schema(value_type = String, example = "RETURNED")]
    pub status: LoanStatus,
}

/// Which loan date a range filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanDateField {
    LoanStartDate,
    LoanEndDate,
}

impl LoanDateField {
    pub fn column(&self) -> &'static str {
        match self {
            LoanDateField::LoanStartDate => "loan_start_date",
            LoanDateField::LoanEndDate => "loan_end_date",
        }
    }
}

/// Loan query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub borrower: Option<String>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub status: Option<LoanStatus>,
    /// Lower bound of the date range
    pub start_date: Option<String>,
    /// Upper bound of the date range
    pub end_date: Option<String>,
    /// Date the range applies to
    pub date_field: Option<LoanDateField>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub disable_pagination: Option<bool>,
}

impl LoanQuery {
    /// Range filter, only when both bounds and the field are given
    pub fn date_range(&self) -> Option<(LoanDateField, &str, &str)> {
        match (self.date_field, self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(field), Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
                Some((field, from, to))
            }
            _ => None,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page, self.disable_pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_are_parsed() {
        assert_eq!(LoanStatus::from("BORROWED"), LoanStatus::Borrowed);
        assert_eq!(LoanStatus::from("returned"), LoanStatus::Returned);
        assert_eq!(LoanStatus::from("LOST"), LoanStatus::Other("LOST".to_string()));
    }

    #[test]
    fn other_status_is_kept_verbatim() {
        let status: LoanStatus = serde_json::from_str("\"Lost\"").unwrap();
        assert_eq!(status, LoanStatus::Other("Lost".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Lost\"");
        assert_eq!(serde_json::to_string(&LoanStatus::Returned).unwrap(), "\"RETURNED\"");
    }

    #[test]
    fn date_range_needs_both_bounds_and_field() {
        let mut query = LoanQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-01-31".to_string()),
            ..Default::default()
        };
        assert!(query.date_range().is_none());

        query.date_field = Some(LoanDateField::LoanEndDate);
        let (field, from, to) = query.date_range().unwrap();
        assert_eq!(field.column(), "loan_end_date");
        assert_eq!((from, to), ("2024-01-01", "2024-01-31"));

        query.end_date = None;
        assert!(query.date_range().is_none());
    }

    #[test]
    fn date_field_deserializes_snake_case() {
        let field: LoanDateField = serde_json::from_str("\"loan_start_date\"").unwrap();
        assert_eq!(field, LoanDateField::LoanStartDate);
    }

    #[test]
    fn create_loan_rejects_empty_dates() {
        let intent = CreateLoan {
            book_code: "LIB-FIC-0001".to_string(),
            borrower: "alice".to_string(),
            loan_start_date: String::new(),
            loan_end_date: "2024-01-15".to_string(),
            status: None,
        };
        assert!(intent.validate().is_err());
    }
}
