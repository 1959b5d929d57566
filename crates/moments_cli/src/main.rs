//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `moments_core` linkage from a standalone executable.
//! - Run one analysis over a fixed sample so output is deterministic.

use moments_core::{analyze, fingerprint, Note, DEFAULT_MIN_CLUSTER_SIZE};
use std::process::ExitCode;
use uuid::Uuid;

const DAY_MS: i64 = 86_400_000;
const SAMPLE_EPOCH_MS: i64 = 1_760_000_000_000;

fn sample_notes() -> Vec<Note> {
    vec![
        Note::with_id(
            Uuid::from_u128(1),
            "Started new job",
            "First day at the tech company. Nervous but excited.",
            SAMPLE_EPOCH_MS,
        ),
        Note::with_id(
            Uuid::from_u128(2),
            "Team lunch",
            "Had lunch with colleagues. Everyone is friendly.",
            SAMPLE_EPOCH_MS + DAY_MS,
        ),
        Note::with_id(
            Uuid::from_u128(3),
            "Weekend hiking",
            "Went hiking to clear my head. Beautiful mountain views.",
            SAMPLE_EPOCH_MS + 3 * DAY_MS,
        ),
    ]
}

fn main() -> ExitCode {
    println!("moments_core ping={}", moments_core::ping());
    println!("moments_core version={}", moments_core::core_version());

    let notes = sample_notes();
    println!("smoke fingerprint={}", fingerprint(&notes));
    match analyze(&notes, DEFAULT_MIN_CLUSTER_SIZE) {
        Ok(moments) => {
            for moment in moments {
                println!(
                    "moment notes={} tone={} score={:.3} title={}",
                    moment.note_count, moment.tone, moment.score, moment.title
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("smoke analysis failed: {err}");
            ExitCode::FAILURE
        }
    }
}
