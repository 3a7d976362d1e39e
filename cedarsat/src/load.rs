//! Clause intake: simplification and dispatch of added clauses.
use partial_ref::{partial, PartialRef};

use crate::clause::{db, ClauseHeader};
use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, SolverStateP, TmpDataP, TrailP,
    WatchlistsP,
};
use crate::lit::Lit;
use crate::prop::{enqueue_assignment, full_restart, Reason};
use crate::state::SatState;

/// Bring one input clause into the solver.
///
/// Duplicate literals are merged and clauses containing a variable in both polarities are
/// tautologies, which are skipped entirely. What remains is simplified against the root-level
/// assignment: a clause with a true root-level literal is dropped and false root-level literals
/// are stripped, neither of which can change the remaining search. An empty result marks the
/// formula unsatisfiable, a single literal becomes a root-level assignment and anything longer
/// is stored and watched.
///
/// The caller must have grown the per-variable tables to cover the clause's variables.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    match ctx.part(SolverStateP).sat_state {
        SatState::Unsat => return,
        SatState::Sat => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unknown;
        }
        SatState::Unknown => (),
    }

    // A new clause invalidates the current search, so drop back to the root level.
    full_restart(ctx.borrow());

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp_data.lits.clear();
    tmp_data.lits.extend_from_slice(lits);
    let lits = &mut tmp_data.lits;
    let reduced_lits = &mut tmp_data.lits_2;

    lits.sort_unstable();
    lits.dedup();

    // Sorting put both polarities of a variable next to each other, so a tautology shows up as
    // a literal following its own negation
    let mut last = None;

    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    // Simplify against the root-level assignment
    reduced_lits.clear();

    for &lit in lits.iter() {
        match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => return,
            Some(false) => (),
            None => {
                reduced_lits.push(lit);
            }
        }
    }

    match reduced_lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => enqueue_assignment(ctx.borrow(), lit, Reason::Decision),
        _ => {
            db::add_clause(ctx.borrow(), ClauseHeader::new(), reduced_lits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use cedarsat_formula::lits;

    use crate::context::set_var_count;

    #[test]
    fn unsat_on_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &[]);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn unit_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1]);

        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        load_clause(ctx.borrow(), &lits![3, -3]);

        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        load_clause(ctx.borrow(), &lits![-2]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        load_clause(ctx.borrow(), &lits![1, 1]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

        load_clause(ctx.borrow(), &lits![2]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn stored_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1, 2, 3]);

        assert_eq!(ctx.part(ClauseDbP).count(), 1);

        load_clause(ctx.borrow(), &lits![-2, 3, 3, 4]);

        assert_eq!(ctx.part(ClauseDbP).count(), 2);

        load_clause(ctx.borrow(), &lits![4, -5, 5, 2]);

        assert_eq!(ctx.part(ClauseDbP).count(), 2);

        load_clause(ctx.borrow(), &lits![7, 8]);

        assert_eq!(ctx.part(ClauseDbP).count(), 3);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);
    }

    #[test]
    fn root_level_simplification() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1]);

        // Satisfied at the root level, dropped
        load_clause(ctx.borrow(), &lits![1, 2, 3]);

        assert_eq!(ctx.part(ClauseDbP).count(), 0);

        // The false literal is removed, leaving a unit clause
        load_clause(ctx.borrow(), &lits![-1, 4]);

        assert_eq!(ctx.part(ClauseDbP).count(), 0);
        assert!(ctx.part(AssignmentP).lit_is_true(lits![4][0]));
    }
}
