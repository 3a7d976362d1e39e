//! Unit propagation and the structures backing it.
use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, ClauseAllocP, Context, ImplGraphP, StatsP, TrailP, WatchlistsP,
};

pub mod assignment;
pub mod clauses;
pub mod graph;
pub mod watch;

pub use assignment::{backtrack, enqueue_assignment, full_restart, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use watch::{Watch, Watchlists};

/// Propagate all consequences of the assignments queued on the trail.
///
/// Propagation of a single assignment can queue further assignments, which are processed in queue
/// order until the queue is empty or a clause is found to be in conflict. On conflict the
/// remaining queue is left in place; it is discarded by the backtracking that follows.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        ctx.part_mut(StatsP).propagations += 1;
        clauses::propagate_clauses(ctx.borrow(), lit)?;
    }
    Ok(())
}
