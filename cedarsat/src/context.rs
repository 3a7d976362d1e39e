//! The solver context.
//!
//! All mutable solver state lives in one [`Context`] struct, split into a dozen `partial_ref`
//! parts: clause storage, the trail and assignment, the watchlists, the implication graph,
//! conflict-analysis scratch space, the branching RNG, configuration, statistics and a few
//! flags. Functions name the parts they read and write in their signature, which keeps the
//! borrow checker out of the way while still documenting every data dependency. The
//! `set_var_count` helper below has to grow along with any new per-variable part.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::analyze_conflict::AnalyzeConflict;
use crate::clause::{ClauseAlloc, ClauseDb};
use crate::config::SolverConfig;
use crate::decision::Branching;
use crate::prop::{Assignment, ImplGraph, Trail, Watchlists};
use crate::state::SolverState;
use crate::stats::Stats;
use crate::tmp::TmpData;

/// The `partial_ref` parts making up the [`Context`].
pub mod parts {
    use super::*;

    part!(pub AnalyzeConflictP: AnalyzeConflict);
    part!(pub AssignmentP: Assignment);
    part!(pub BranchingP: Branching);
    part!(pub ClauseAllocP: ClauseAlloc);
    part!(pub ClauseDbP: ClauseDb);
    part!(pub ImplGraphP: ImplGraph);
    part!(pub SolverConfigP: SolverConfig);
    part!(pub SolverStateP: SolverState);
    part!(pub StatsP: Stats);
    part!(pub TmpDataP: TmpData);
    part!(pub TrailP: Trail);
    part!(pub WatchlistsP: Watchlists);
}

pub use parts::*;

/// All solver state, one field per part.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(AnalyzeConflictP)]
    pub analyze_conflict: AnalyzeConflict,
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(BranchingP)]
    pub branching: Branching,
    #[part(ClauseAllocP)]
    pub clause_alloc: ClauseAlloc,
    #[part(ClauseDbP)]
    pub clause_db: ClauseDb,
    #[part(ImplGraphP)]
    pub impl_graph: ImplGraph,
    #[part(SolverConfigP)]
    pub solver_config: SolverConfig,
    #[part(SolverStateP)]
    pub solver_state: SolverState,
    #[part(StatsP)]
    pub stats: Stats,
    #[part(TmpDataP)]
    pub tmp_data: TmpData,
    #[part(TrailP)]
    pub trail: Trail,
    #[part(WatchlistsP)]
    pub watchlists: Watchlists,
}

/// Resize every per-variable table to the given variable count.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    ctx.part_mut(AnalyzeConflictP).set_var_count(count);
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(ImplGraphP).set_var_count(count);
    ctx.part_mut(WatchlistsP).set_var_count(count);
}

/// Grow the per-variable tables when the formula brings new variables.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).assignment().len() {
        set_var_count(ctx.borrow(), count)
    }
}
