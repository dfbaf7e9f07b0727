// =============================================================================
// Signals Module
// =============================================================================
//
// Rule-based scoring pipeline:
// - Independent rule evaluators over the last two indicator snapshots
// - Score folding and label/confidence mapping

pub mod recommendation;
pub mod rules;

pub use recommendation::{recommend, Recommendation};
