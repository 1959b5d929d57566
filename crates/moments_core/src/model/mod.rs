//! Domain records consumed and produced by the analysis pipeline.
//!
//! # Responsibility
//! - Define the read-only note input shape supplied by callers.
//! - Define the derived moment record returned by analysis.
//!
//! # Invariants
//! - Notes are never mutated by core.
//! - Moments are fully derived from one analysis run and carry no identity
//!   of their own.

pub mod moment;
pub mod note;
