// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod dropdown_api {
    pub use crate::dropdown_api::*;
}
