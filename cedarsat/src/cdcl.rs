//! The conflict driven clause learning loop.
use log::debug;
use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{db, ClauseHeader};
use crate::context::{
    AnalyzeConflictP, AssignmentP, BranchingP, ClauseAllocP, ClauseDbP, Context, ImplGraphP,
    SolverStateP, StatsP, TrailP, WatchlistsP,
};
use crate::decision::make_decision;
use crate::prop::{backtrack, enqueue_assignment, propagate, Conflict, Reason};
use crate::state::SatState;

/// One round of the CDCL loop: search up to the next conflict, then learn from it and backjump.
///
/// When no conflict is left to be found the formula is satisfiable; when the learned clause is
/// empty it is unsatisfiable. Both outcomes are recorded in the solver state.
pub fn conflict_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BranchingP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
) {
    let conflict = find_conflict(ctx.borrow());

    let conflict = match conflict {
        Ok(()) => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            return;
        }
        Err(FoundConflict::Interrupted) => {
            ctx.part_mut(SolverStateP).interrupted = true;
            return;
        }
        Err(FoundConflict::Conflict(conflict)) => conflict,
    };

    ctx.part_mut(StatsP).conflicts += 1;

    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);

    let clause = analyze.clause();

    if clause.is_empty() {
        ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
        return;
    }

    debug!(
        "learned clause of length {} asserting {} at level {}",
        clause.len(),
        clause[0],
        backtrack_to
    );

    backtrack(ctx.borrow(), backtrack_to);

    ctx.part_mut(StatsP).learnt_clauses += 1;

    let reason = match clause.len() {
        1 => Reason::Decision,
        _ => {
            let cref = db::add_clause(ctx.borrow(), ClauseHeader::new(), clause);
            Reason::Clause(cref)
        }
    };

    enqueue_assignment(ctx.borrow(), clause[0], reason);
}

/// How [`find_conflict`] came to stop searching.
enum FoundConflict {
    Conflict(Conflict),
    Interrupted,
}

impl From<Conflict> for FoundConflict {
    fn from(conflict: Conflict) -> FoundConflict {
        FoundConflict::Conflict(conflict)
    }
}

/// Find a conflict.
///
/// Propagates pending assignments and makes decisions until either a conflict is found (`Err`)
/// or all variables are assigned without one, i.e. the current assignment is a model (`Ok`).
///
/// The top of the loop is the solver's cooperative cancellation point: when an interrupt was
/// requested the search stops before the next propagation.
fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut BranchingP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
        SolverStateP,
    ),
) -> Result<(), FoundConflict> {
    loop {
        if ctx.part(SolverStateP).take_interrupt_request() {
            return Err(FoundConflict::Interrupted);
        }

        propagate(ctx.borrow())?;

        if !make_decision(ctx.borrow()) {
            debug_assert!(ctx.part(TrailP).fully_propagated());
            return Ok(());
        }
    }
}
