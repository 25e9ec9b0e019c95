//! Fleet: vehicle inventory for waste-collection operators
//!
//! Vehicle records live in a local SQLite store. The library exposes search
//! and upsert, spreadsheet import, placeholder generation and PDF reports;
//! the `fleet` binary is a thin CLI over it.

pub mod cli;
pub mod core;
pub mod entities;
pub mod report;
