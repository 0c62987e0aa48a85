//! External service integrations.

pub mod content_client {
    pub use crate::content_client::*;
}
