// src/core/mod.rs

pub mod arg_parser;
pub mod cleanup;
pub mod config_loader;
pub mod crash;
pub mod errors;
pub mod options;
pub mod paths;
pub mod permissions;
pub mod servers;
pub mod tree_resolver;
