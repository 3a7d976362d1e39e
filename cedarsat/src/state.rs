//! Search outcome and interrupt flags.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the search has established about the formula so far.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Small bits of solver state that don't warrant a part of their own: the satisfiability
/// verdict and the interrupt plumbing.
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Set when the search stopped because an interrupt was requested.
    pub interrupted: bool,
    /// Flag shared with [`InterruptHandle`](crate::solver::InterruptHandle) values.
    interrupt_requested: Arc<AtomicBool>,
}

impl SolverState {
    /// Whether an interrupt was requested, consuming the request.
    ///
    /// A request set while no search is running is consumed by the next search.
    pub fn take_interrupt_request(&self) -> bool {
        self.interrupt_requested.swap(false, Ordering::Relaxed)
    }

    /// The flag used to request an interrupt of the running search.
    pub fn interrupt_flag(&self) -> &Arc<AtomicBool> {
        &self.interrupt_requested
    }
}
