//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, health, users};

/// Registers the bearer scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Library management REST API: catalog, borrowings and accounts"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth & catalog
        auth::register,
        auth::login,
        auth::search_books,
        auth::get_book,
        auth::most_borrowed,
        // Users
        users::refresh_token,
        users::borrow_book,
        users::return_book,
        // Admin
        admin::create_book,
        admin::update_book,
        admin::delete_book,
    ),
    components(
        schemas(
            crate::models::user::Role,
            crate::models::user::RegisterUser,
            crate::models::user::RegisteredUser,
            crate::models::user::LoginRequest,
            crate::models::user::AccessToken,
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::MostBorrowed,
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowRequest,
            crate::models::borrowing::ReturnRequest,
            admin::MessageResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Catalog browsing"),
        (name = "users", description = "Signed-in user session"),
        (name = "borrowings", description = "Borrowing and returning books"),
        (name = "admin", description = "Catalog management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
