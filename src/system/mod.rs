//! # System Interaction Layer
//!
//! This module provides abstractions for interacting with the underlying operating system.
//! It serves as the boundary between the dispatch pipeline and the host.
//!
//! ## Modules
//!
//! - **`fs`**: The [`fs::FileSystem`] seam consumed by tree resolution, the permission
//!   checker and scheduled cleanup, plus the host implementation [`fs::LocalFs`].

pub mod fs;
