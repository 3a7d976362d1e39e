//! Solver configuration.

/// The knobs a caller can turn before solving.
pub struct SolverConfig {
    /// Seed for the random branching heuristic. (Default: 5201314)
    ///
    /// Runs of the solver with the same formula and the same seed make the same decisions and
    /// thus produce the same result.
    pub seed: u64,
}

impl SolverConfig {
    /// Seed used when no other seed is configured.
    pub const DEFAULT_SEED: u64 = 5201314;
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            seed: SolverConfig::DEFAULT_SEED,
        }
    }
}
