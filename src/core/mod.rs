//! Core types, settings and target-list parsing, digest database.

pub mod database;
pub mod parser;
pub mod types;
