//! Report commands

pub mod nodes;
pub mod pods;
