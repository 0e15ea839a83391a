//! # rockport
//!
//! The command dispatch front end of a Lua rocks package manager: argument and
//! variable extraction, tree and configuration resolution, permission checks,
//! and crash-isolated dispatch to registered commands.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

#[cfg(test)]
mod test_support;
