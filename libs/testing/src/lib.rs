//! Test fixtures shared across the workspace.

pub mod fixtures;
