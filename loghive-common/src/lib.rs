mod config;
mod error;
mod types;

pub use config::*;
pub use error::LoghiveError;
pub use types::*;
