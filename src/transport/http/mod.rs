pub mod rate_limit;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod categories;
    pub mod common;
    pub mod health;
    pub mod products;
    pub mod records;
    pub mod upload;
}

pub use rate_limit::{rate_limit_layer, RateLimitConfig};
pub use router::{build_app, create_router, ApiDoc};
pub use types::AppState;
