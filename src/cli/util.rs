//! Small parsing/formatting helpers shared across `runner.rs` commands.

use crate::types::{DecisionKind, Tier};

#[must_use]
pub fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Stat => "stat",
        Tier::Size => "size",
        Tier::Fringe => "fringe",
        Tier::Full => "full",
    }
}

#[must_use]
pub fn decision_label(kind: DecisionKind) -> &'static str {
    match kind {
        DecisionKind::Unique => "unique",
        DecisionKind::Duplicate => "duplicate",
        DecisionKind::Skipped => "skipped",
    }
}
