//! CLI infrastructure for the kindness algorithm levels
//!
//! This module provides the command-line interface for listing levels,
//! running them with default or file-supplied inputs, and exploring MDPs.

pub mod commands;
pub mod config;
pub mod output;
