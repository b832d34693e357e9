//! Domain model for survey authoring and response collection.
//!
//! # Responsibility
//! - Define the canonical survey, instrument-tree and question shapes.
//! - Keep structural invariants (hierarchy levels, question numbering)
//!   enforced by in-memory operations, independent of storage.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Instrument codes are assigned once at creation and never regenerated.
//! - Question numbers stay densely packed (`1..=N`) within one survey.

pub mod code;
pub mod instrument;
pub mod post_submit;
pub mod question;
pub mod question_bank;
pub mod respondent;
pub mod survey;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in unix epoch milliseconds.
///
/// Clamps to zero for clocks set before the epoch instead of panicking.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
