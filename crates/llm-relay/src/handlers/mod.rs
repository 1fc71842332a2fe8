//! HTTP request handlers.

mod chat;
mod health;
mod models;

pub use chat::chat;
pub use health::{livez, readyz};
pub use models::list_models;
