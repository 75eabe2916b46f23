//! The `dogshare` command line tool: argument parsing, logging setup, command
//! wiring and the `list` table.

pub mod app;
pub mod cli;
pub mod table;
pub mod telemetry;

pub use app::run;
pub use cli::{Cli, Command};
