pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod local_state;
pub mod run;
pub mod selection;
pub mod transfer;
pub mod utils;

pub use config::Config;
pub use error::{ErrorKind, LoopMirrorError};
