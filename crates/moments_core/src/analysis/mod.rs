//! Note analysis pipeline.
//!
//! # Responsibility
//! - Cluster notes by fused text/temporal similarity.
//! - Synthesize one moment per cluster from keywords and sentiment.
//! - Provide the content fingerprint used by callers as a cache key.
//!
//! # Invariants
//! - Every computation is pure and synchronous; fitted models are per-call
//!   locals and never shared.
//! - Numerical degeneracies are reported as `Outcome::Fallback`, not errors.

pub mod cluster;
pub mod fingerprint;
pub mod keywords;
pub mod linkage;
pub mod outcome;
pub mod preprocess;
pub mod sentiment;
pub mod stop_words;
pub mod synthesize;
pub mod vectorizer;
