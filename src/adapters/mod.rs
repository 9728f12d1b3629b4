//! Infrastructure adapters. Implement outbound ports.
//!
//! Gemini, filesystem, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod knowledge;
pub mod persistence;
pub mod ui;
