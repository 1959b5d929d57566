//! Moment analysis core.
//!
//! Groups timestamped notes into thematically and temporally coherent
//! moments, each annotated with keywords, tone and a reflection prompt.
//! Storage, transport and authentication belong to the calling service.

pub mod analysis;
pub mod logging;
pub mod model;
pub mod service;

pub use analysis::cluster::{
    cluster, ClusterConfig, ClusterFallback, Partition, DEFAULT_MIN_CLUSTER_SIZE,
};
pub use analysis::fingerprint::fingerprint;
pub use analysis::keywords::{extract_keywords, DEFAULT_TOP_K};
pub use analysis::linkage::LinkageError;
pub use analysis::outcome::Outcome;
pub use analysis::preprocess::normalize;
pub use analysis::sentiment::{score_sentiment, SentimentLexicon};
pub use analysis::stop_words::StopWords;
pub use analysis::synthesize::{synthesize, SynthesisConfig, SynthesisError};
pub use analysis::vectorizer::{TfidfVectorizer, VectorizeError, VectorizerConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::moment::{Moment, Tone};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use service::moment_service::{
    analyze, AnalysisConfig, AnalysisError, AnalysisReport, AnalysisRequest, MomentService,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
