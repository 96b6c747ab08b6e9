//! Test helpers shared across the wiregen crates.
//!
//! - [`env`] serialises process-environment mutation behind RAII guards.
//! - [`fs`] creates UTF-8 temporary project trees.

pub mod env;
pub mod fs;
