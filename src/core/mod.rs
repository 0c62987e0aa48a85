// Domain-layer modules and shared errors/models
pub mod field_name {
    pub use crate::field_name::*;
}

pub mod dropdown_builder {
    pub use crate::dropdown_builder::*;
}

pub mod dedupe {
    pub use crate::dedupe::*;
}

pub mod verification {
    pub use crate::verification::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
