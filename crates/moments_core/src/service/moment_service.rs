//! Moment analysis use-case service.
//!
//! # Responsibility
//! - Validate caller input and run the full clustering/synthesis pipeline.
//! - Support time-window requests and report cache fingerprints.
//!
//! # Invariants
//! - Empty input yields an empty moment list.
//! - Returned moments partition the analyzed notes and are sorted by
//!   `start_date` ascending.
//! - The service holds configuration only; concurrent calls share nothing
//!   mutable.

use crate::analysis::cluster::{cluster, ClusterConfig, DEFAULT_MIN_CLUSTER_SIZE};
use crate::analysis::fingerprint::fingerprint;
use crate::analysis::synthesize::{synthesize, SynthesisConfig, SynthesisError};
use crate::model::moment::Moment;
use crate::model::note::{Note, NoteValidationError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub cluster: ClusterConfig,
    pub synthesis: SynthesisConfig,
}

/// Windowed analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Inclusive lower bound on `created_at`, epoch milliseconds.
    pub start: Option<i64>,
    /// Inclusive upper bound on `created_at`, epoch milliseconds.
    pub end: Option<i64>,
    pub min_cluster_size: usize,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
        }
    }
}

impl AnalysisRequest {
    fn contains(&self, created_at: i64) -> bool {
        self.start.map_or(true, |start| created_at >= start)
            && self.end.map_or(true, |end| created_at <= end)
    }
}

/// Result envelope for windowed analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Moments sorted by `start_date` ascending.
    pub moments: Vec<Moment>,
    /// Notes remaining after window filtering.
    pub total_notes_analyzed: usize,
    pub elapsed_ms: u64,
    /// Fingerprint of the analyzed notes in input order.
    pub fingerprint: String,
}

/// Contract violations reported by analysis entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// `min_cluster_size` must be at least 1.
    InvalidMinClusterSize(usize),
    InvalidNote(NoteValidationError),
    /// Request window has `start > end`.
    InvalidWindow { start: i64, end: i64 },
    Synthesis(SynthesisError),
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMinClusterSize(value) => {
                write!(f, "min_cluster_size must be >= 1, got {value}")
            }
            Self::InvalidNote(err) => write!(f, "{err}"),
            Self::InvalidWindow { start, end } => {
                write!(f, "analysis window start {start} is after end {end}")
            }
            Self::Synthesis(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AnalysisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNote(err) => Some(err),
            Self::Synthesis(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for AnalysisError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

impl From<SynthesisError> for AnalysisError {
    fn from(value: SynthesisError) -> Self {
        Self::Synthesis(value)
    }
}

/// Analysis facade over the clustering and synthesis pipeline.
#[derive(Debug, Clone, Default)]
pub struct MomentService {
    config: AnalysisConfig,
}

impl MomentService {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Groups `notes` into moments sorted by `start_date`.
    ///
    /// Notes are sorted by `created_at` (stable) before clustering, so input
    /// order only affects ties.
    ///
    /// # Errors
    /// - `InvalidMinClusterSize` when `min_cluster_size == 0`.
    /// - `InvalidNote` when a timestamp cannot be represented.
    pub fn analyze(
        &self,
        notes: &[Note],
        min_cluster_size: usize,
    ) -> Result<Vec<Moment>, AnalysisError> {
        if min_cluster_size == 0 {
            return Err(AnalysisError::InvalidMinClusterSize(min_cluster_size));
        }
        if notes.is_empty() {
            return Ok(Vec::new());
        }
        for note in notes {
            note.validate()?;
        }

        let started = Instant::now();
        let mut sorted = notes.to_vec();
        sorted.sort_by_key(|note| note.created_at);

        let partition = cluster(&sorted, min_cluster_size, &self.config.cluster);
        if let Some(cause) = partition.cause() {
            debug!(
                "event=analyze module=service status=fallback notes={} cause=\"{}\"",
                sorted.len(),
                cause
            );
        }

        let mut moments = partition
            .value()
            .iter()
            .map(|group| {
                let members = group
                    .iter()
                    .map(|index| sorted[*index].clone())
                    .collect::<Vec<_>>();
                synthesize(&members, &self.config.synthesis)
            })
            .collect::<Result<Vec<_>, _>>()?;
        moments.sort_by_key(|moment| moment.start_date);

        info!(
            "event=analyze module=service status=ok notes={} moments={} elapsed_ms={}",
            sorted.len(),
            moments.len(),
            started.elapsed().as_millis()
        );
        Ok(moments)
    }

    /// Runs analysis over the notes inside the request window.
    ///
    /// # Errors
    /// - `InvalidWindow` when `start > end`.
    /// - Any error from [`MomentService::analyze`].
    pub fn analyze_request(
        &self,
        notes: &[Note],
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, AnalysisError> {
        if let (Some(start), Some(end)) = (request.start, request.end) {
            if start > end {
                return Err(AnalysisError::InvalidWindow { start, end });
            }
        }

        let started = Instant::now();
        let windowed = notes
            .iter()
            .filter(|note| request.contains(note.created_at))
            .cloned()
            .collect::<Vec<_>>();
        let moments = self.analyze(&windowed, request.min_cluster_size)?;

        Ok(AnalysisReport {
            moments,
            total_notes_analyzed: windowed.len(),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            fingerprint: fingerprint(&windowed),
        })
    }
}

/// Analyzes `notes` with default configuration.
pub fn analyze(notes: &[Note], min_cluster_size: usize) -> Result<Vec<Moment>, AnalysisError> {
    MomentService::default().analyze(notes, min_cluster_size)
}
