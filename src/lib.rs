pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod plc;
pub mod report;
pub mod wms;

pub use error::{AppError, Result};
