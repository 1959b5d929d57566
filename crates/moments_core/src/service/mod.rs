//! Core use-case services.
//!
//! # Responsibility
//! - Expose the analysis entry points consumed by the note service layer.
//! - Keep callers decoupled from pipeline internals.

pub mod moment_service;
