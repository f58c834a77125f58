//! crowdin-sync as a library
//!
//! Exposes the argument parser, exit codes and output types so they can be
//! driven without spawning the binary.

pub mod commands;
pub mod exit_code;
pub mod output;
