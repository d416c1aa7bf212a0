#![warn(clippy::unwrap_used)]

pub mod benefits_rest;
pub mod history_rest;
pub mod import_rest;
pub mod rest;
pub mod server;
pub mod swagger;

pub use rest::AppState;
pub use server::ApiServer;
pub use swagger::ApiDoc;
