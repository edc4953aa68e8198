//! Command-line interface and command drivers.

mod args;

pub mod delete;
pub mod search;
pub mod upload;

pub use args::{Cli, Commands, DeleteArgs, SearchArgs, UploadArgs};
