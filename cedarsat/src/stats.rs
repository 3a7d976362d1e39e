//! Solver statistics.

/// Counters describing the work performed by the solver.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    /// Number of branching decisions made.
    pub decisions: u64,
    /// Number of conflicts found during propagation.
    pub conflicts: u64,
    /// Number of assignments processed by unit propagation.
    pub propagations: u64,
    /// Number of clauses learned from conflicts, including unit clauses.
    pub learnt_clauses: u64,
}
