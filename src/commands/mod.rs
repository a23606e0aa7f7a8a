pub mod audit;

pub use audit::{exit_code, run_audit_command, run_audit_impl};
