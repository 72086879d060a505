//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for Storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Product search and filtering API for the storefront",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3004", description = "Local development server")
    ),
    nest(
        (path = "/api/search", api = domain_catalog::ApiDoc)
    ),
    tags(
        (name = "Search", description = "Product search and filtering endpoints")
    )
)]
pub struct ApiDoc;
