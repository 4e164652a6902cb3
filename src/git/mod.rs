pub mod commands;
pub mod error;
pub mod exec;
#[cfg(all(test, unix))]
pub mod fake;
pub mod types;

pub use commands::GitCli;
pub use error::{CommandResult, GitError};
pub use exec::Executor;
pub use types::Revision;
