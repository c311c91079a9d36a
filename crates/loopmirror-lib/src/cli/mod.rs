mod args;
mod resolved_command;

pub use args::{Args, Command, RunOverrides, parse_args};
pub use resolved_command::{ResolvedCommand, resolve_command, resolve_run_params};
