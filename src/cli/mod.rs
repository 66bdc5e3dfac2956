//! CLI command implementations
//!
//! - `zones`: catalog commands (validate, match, reconcile)
//! - `quote`: cart pricing
//! - `config`: configuration check and schema output
//! - `logging`: tracing subscriber setup
//! - `util`: shared argument and file helpers

pub mod config;
pub mod logging;
pub mod quote;
pub mod util;
pub mod zones;

pub use config::{cmd_check_config, cmd_schema};
pub use quote::cmd_quote;
pub use zones::{cmd_match, cmd_reconcile, cmd_validate};
