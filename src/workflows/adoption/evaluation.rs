//! Aggregation of per-pet decisions into an application-level status.
//!
//! `evaluate` is a pure function over the decision set so it can be exercised
//! without any persistence in place; the workflow service owns reading the
//! decisions and writing the derived status back.

use super::domain::{ApplicationStatus, DecisionOutcome};

/// Single-pass counts over one application's decision set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionTally {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub undecided: usize,
}

impl DecisionTally {
    pub fn count(outcomes: &[DecisionOutcome]) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            tally.total += 1;
            match outcome {
                DecisionOutcome::Approved => tally.approved += 1,
                DecisionOutcome::Rejected => tally.rejected += 1,
                DecisionOutcome::Undecided => tally.undecided += 1,
            }
        }
        tally
    }

    pub fn decided(&self) -> usize {
        self.total - self.undecided
    }

    /// Human-readable progress line for status payloads.
    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "no pets on application yet".to_string();
        }
        format!(
            "{} of {} pet decisions recorded ({} approved, {} rejected)",
            self.decided(),
            self.total,
            self.approved,
            self.rejected
        )
    }
}

/// Derive the aggregate status for one application.
///
/// An application is Approved only when every decision is in and all of them
/// approve; the empty set stays Pending so an application is never approved
/// vacuously. A single rejection finalizes the application as Rejected, but
/// only once no decision is still outstanding.
pub fn evaluate(outcomes: &[DecisionOutcome]) -> ApplicationStatus {
    let tally = DecisionTally::count(outcomes);

    if tally.total == 0 || tally.undecided > 0 {
        return ApplicationStatus::Pending;
    }

    if tally.rejected > 0 {
        ApplicationStatus::Rejected
    } else {
        ApplicationStatus::Approved
    }
}
