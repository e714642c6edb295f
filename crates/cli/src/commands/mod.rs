//! Subcommand implementations

pub mod descriptor;
pub mod locate;
pub mod policies;
pub mod run;
