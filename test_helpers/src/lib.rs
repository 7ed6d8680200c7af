//! Test helpers shared across crates.
//!
//! This crate provides temporary YAML source trees and helpers for reading
//! command output.

pub mod text;
pub mod tree;
