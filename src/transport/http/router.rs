use crate::transport::http::handlers::{categories, health, products, upload};
use crate::transport::http::rate_limit::{rate_limit_layer, RateLimitConfig};
use crate::transport::http::types::{AppState, HealthResponse, MessageResponse, UploadForm, UploadResponse};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::list_products_handler,
        products::create_product_handler,
        products::update_product_handler,
        products::delete_product_handler,
        categories::list_categories_handler,
        categories::create_category_handler,
        categories::update_category_handler,
        categories::delete_category_handler,
        upload::upload_handler
    ),
    components(schemas(MessageResponse, UploadResponse, UploadForm, HealthResponse))
)]
pub struct ApiDoc;

/// The REST surface without cross-cutting middleware.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/products",
            get(products::list_products_handler).post(products::create_product_handler),
        )
        .route(
            "/products/:id",
            put(products::update_product_handler).delete(products::delete_product_handler),
        )
        .route(
            "/categories",
            get(categories::list_categories_handler).post(categories::create_category_handler),
        )
        .route(
            "/categories/:id",
            put(categories::update_category_handler).delete(categories::delete_category_handler),
        )
        .route(
            "/upload",
            post(upload::upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .with_state(app_state)
}

/// The full application: routes, Swagger UI, CORS, request tracing and the
/// fixed-window rate limiter shared by every route.
pub fn build_app(app_state: AppState, rate_limit: RateLimitConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(rate_limit_layer(rate_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;

    #[test]
    fn openapi_documents_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = &doc["paths"];
        for (path, method) in [
            ("/health", "get"),
            ("/products", "get"),
            ("/products", "post"),
            ("/products/{id}", "put"),
            ("/products/{id}", "delete"),
            ("/categories", "get"),
            ("/categories", "post"),
            ("/categories/{id}", "put"),
            ("/categories/{id}", "delete"),
            ("/upload", "post"),
        ] {
            assert!(paths[path][method].is_object(), "{method} {path} missing");
        }
    }

    #[test]
    fn record_writes_declare_a_json_body() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        for (path, method) in [
            ("/products", "post"),
            ("/products/{id}", "put"),
            ("/categories", "post"),
            ("/categories/{id}", "put"),
        ] {
            let content: &JsonValue = &doc["paths"][path][method]["requestBody"]["content"];
            assert!(content["application/json"].is_object(), "{method} {path}");
        }
        assert!(doc["paths"]["/upload"]["post"]["requestBody"]["content"]["multipart/form-data"].is_object());
    }
}
