//! Local environment helpers: model discovery and inference server checks.

pub mod model_catalog;
pub mod server_status;

pub use model_catalog::{available_models, model_path};
pub use server_status::{check_server, ServerStatus};
