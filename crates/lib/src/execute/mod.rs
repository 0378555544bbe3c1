//! External process execution for targets that delegate to other tools.

pub mod cmd;
pub mod types;

pub use cmd::{CommandRunner, SystemRunner};
pub use types::{ExecuteError, Invocation};
