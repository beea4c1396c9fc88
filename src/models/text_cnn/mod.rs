/// The model configuration
pub mod config;

/// The model
pub mod model;

pub use config::Config;
pub use model::Model;
