//! CLI command handlers, one file per command.

mod checksum;
mod completions;
mod fetch;
mod get;
mod lookup;
mod progress;
mod serve;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use fetch::run_fetch;
pub use get::run_get;
pub use lookup::run_lookup;
pub use serve::run_serve;
