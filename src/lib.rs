pub mod app_proxy;
pub mod client;
pub mod configuration;
pub mod error;
pub mod humanize;
pub mod loader;
pub mod mapping;
pub mod schema;
pub mod settings;
pub mod specification;
pub mod state;
pub mod workspace;

pub use error::{JobError, Result};
