pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod ocr;

pub use config::Config;
pub use error::{PagelensError, Result};
