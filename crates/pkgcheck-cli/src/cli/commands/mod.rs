//! CLI command handlers, one file per subcommand.

mod check;
mod fetch;
mod keys;
mod output;

pub use check::run_check;
pub use fetch::run_fetch;
pub use keys::run_keys;
