//! CLI command handlers extracted from main.

pub mod build;
pub mod doctor;
pub mod requires;
