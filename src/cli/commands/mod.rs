//! Subcommands of the `kindness` binary

pub mod level;
pub mod list;
pub mod mdp;
pub mod run;
