//! Price list bulk editing: multi-cell selection, value fan-out and a pending
//! edit overlay over a variant × currency price matrix, with SQLite storage
//! and CSV/XLSX import.

pub mod config;
pub mod domain;
pub mod infra;
pub mod usecase;

#[cfg(test)]
mod tests;
