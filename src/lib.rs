pub mod audit;
pub mod cli;
pub mod commands;
pub mod database;
pub mod datalayer;
pub mod error;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod registry;
pub mod schema;
pub mod telemetry;

pub use error::{Result, TinaError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_AUDIT_FAILED: i32 = 1;
pub const EXIT_RUNTIME_ERROR: i32 = 2;
