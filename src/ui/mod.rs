//! Shared view helpers

pub mod field;
pub mod format;
pub mod theme;
