//! API handlers for the lending REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{
        authorization::{Basic, Bearer},
        Authorization,
    },
    TypedHeader,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing or malformed bearer token".to_string()))?;

        let claims = state.services.users.validate_token(bearer.token())?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor guarding administrative routes with HTTP basic auth
pub struct AdminCredentials;

#[async_trait]
impl FromRequestParts<AppState> for AdminCredentials {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing basic credentials".to_string()))?;

        let auth = &state.config.auth;
        if basic.username() != auth.basic_auth_username || basic.password() != auth.basic_auth_password {
            tracing::warn!(user = %basic.username(), "Rejected basic credentials");
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        Ok(AdminCredentials)
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items matching the filters
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page, 0 when pagination is disabled
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, pagination: crate::models::Pagination) -> Self {
        if pagination.disabled {
            return Self { items, total, page: 1, per_page: 0 };
        }
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        create_router,
        models::user::{Role, UserClaims},
        repository::Repository,
        services::Services,
        AppState,
    };

    // Routes below are rejected before any query runs, so the pool never connects
    fn state() -> AppState {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let services = Services::new(Repository::new(pool), &config);
        AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }

    fn bearer(role: Role, secret: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "1".to_string(),
            username: "alice".to_string(),
            role,
            iat: now,
            exp: now + 3600,
        };
        format!("Bearer {}", claims.create_token(secret).unwrap())
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        create_router(state()).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn health_is_public() {
        let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn page_beyond_any_offset_is_a_bad_request() {
        let request = Request::get("/api/v1/books?page=9223372036854775807")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn responses_carry_cors_headers() {
        let request = Request::get("/api/v1/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = create_router(state()).oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn loans_require_a_bearer_token() {
        let request = Request::get("/api/v1/loans").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let request = Request::get("/api/v1/loans")
            .header(AUTHORIZATION, bearer(Role::Admin, "not-the-secret"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleting_a_loan_requires_an_admin() {
        let secret = AppConfig::default().auth.jwt_secret;
        let request = Request::delete("/api/v1/loans/LOAN-alice-0001")
            .header(AUTHORIZATION, bearer(Role::Employee, &secret))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn book_writes_require_basic_credentials() {
        let request = Request::delete("/api/v1/books/LIB-FIC-0001")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);

        // admin:wrong
        let request = Request::delete("/api/v1/books/LIB-FIC-0001")
            .header(AUTHORIZATION, "Basic YWRtaW46d3Jvbmc=")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn users_require_basic_credentials() {
        let request = Request::get("/api/v1/users/alice").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }
}
