//! Propagation of watched clauses.
use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, ClauseAllocP, Context, ImplGraphP, TrailP, WatchlistsP};
use crate::lit::Lit;

use super::enqueue_assignment;
use super::{Conflict, Reason, Watch};

/// Process every clause affected by the assignment of `lit`, propagating where forced.
///
/// On conflict return the clause propagating the conflicting assignment.
///
/// The watch invariants this maintains are described in [`prop::watch`](crate::prop::watch).
///
/// The watch list of the literal is scanned with separate read and write positions, compacting
/// the list in place. Re-watching a clause appends to some other literal's watch list, so the
/// clauses watched at loop entry are visited exactly once each.
pub fn propagate_clauses(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    let false_lit = !lit;

    let mut read = 0;
    let mut write = 0;
    let len = ctx.part(WatchlistsP).watched_by(lit).len();

    let mut result = Ok(());

    'watches: while read < len {
        let watch = ctx.part(WatchlistsP).watched_by(lit)[read];
        read += 1;

        // A true blocking literal means the clause is satisfied, no need to read it at all.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            ctx.part_mut(WatchlistsP).watched_by_mut(lit)[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;
        let lits = alloc.clause_mut(cref).lits_mut();

        // The falsified watched literal always goes to position 1 before the rescan, keeping
        // position 0 free for a literal this clause may propagate.
        if lits[0] == false_lit {
            lits.swap(0, 1);
        }
        debug_assert_eq!(lits[1], false_lit);

        let other = lits[0];

        // Whatever happens below, the surviving watch uses the other watched literal as its
        // blocking literal.
        let new_watch = Watch {
            cref,
            blocking: other,
        };

        // The clause may also be satisfied through the other watched literal, unless that is
        // the blocking literal we already tested.
        if other != watch.blocking && ctx.part(AssignmentP).lit_is_true(other) {
            ctx.part_mut(WatchlistsP).watched_by_mut(lit)[write] = new_watch;
            write += 1;
            continue;
        }

        // Look for a non-false literal in the unwatched tail to take over the watch.
        for pos in 2..lits.len() {
            let candidate = lits[pos];
            if !ctx.part(AssignmentP).lit_is_false(candidate) {
                lits[1] = candidate;
                lits[pos] = false_lit;
                ctx.part_mut(WatchlistsP).add_watch(candidate, new_watch);
                continue 'watches;
            }
        }

        // No replacement, so either the clause became unit or all its literals are false.
        // Either way the watch stays.
        ctx.part_mut(WatchlistsP).watched_by_mut(lit)[write] = new_watch;
        write += 1;

        if ctx.part(AssignmentP).lit_is_false(other) {
            // Conflict; move the unprocessed watches down before bailing out.
            let watches = ctx.part_mut(WatchlistsP).watched_by_mut(lit);
            while read < len {
                let unprocessed = watches[read];
                watches[write] = unprocessed;
                write += 1;
                read += 1;
            }

            result = Err(Conflict { cref });
            break;
        }

        debug_assert!(ctx.part(AssignmentP).lit_is_unk(other));
        enqueue_assignment(ctx.borrow(), other, Reason::Clause(cref));
    }

    ctx.part_mut(WatchlistsP).watched_by_mut(lit).truncate(write);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use cedarsat_formula::{cnf_formula, lits};

    use crate::clause::{db, ClauseHeader};
    use crate::context::{set_var_count, ClauseDbP};
    use crate::prop::propagate;

    fn ctx_with_clauses(ctx: &mut Context, clauses: &cedarsat_formula::CnfFormula) {
        let mut ctx = ctx.into_partial_ref_mut();
        set_var_count(ctx.borrow(), clauses.var_count());
        for clause in clauses.iter() {
            db::add_clause(ctx.borrow(), ClauseHeader::new(), clause);
        }
    }

    #[test]
    fn propagation_chain() {
        let mut ctx = Context::default();
        ctx_with_clauses(
            &mut ctx,
            &cnf_formula![
                -1, 2, 3;
                -2, -3;
                -1, -2, 4;
            ],
        );

        let mut ctx = ctx.into_partial_ref_mut();

        enqueue_assignment(ctx.borrow(), lits![1][0], Reason::Decision);
        enqueue_assignment(ctx.borrow(), lits![2][0], Reason::Decision);

        assert!(propagate(ctx.borrow()).is_ok());

        assert!(ctx.part(AssignmentP).lit_is_false(lits![3][0]));
        assert!(ctx.part(AssignmentP).lit_is_true(lits![4][0]));

        let graph = ctx.part(ImplGraphP);
        assert!(!graph.reason(lits![3][0].var()).is_decision());
        assert!(!graph.reason(lits![4][0].var()).is_decision());

        // Re-propagating with an empty queue changes nothing.
        let trail_len = ctx.part(TrailP).trail().len();
        assert!(propagate(ctx.borrow()).is_ok());
        assert_eq!(ctx.part(TrailP).trail().len(), trail_len);
    }

    #[test]
    fn propagation_detects_conflict() {
        let mut ctx = Context::default();
        ctx_with_clauses(
            &mut ctx,
            &cnf_formula![
                -1, 2;
                -1, -2, 3;
                -2, -3;
            ],
        );

        let mut ctx = ctx.into_partial_ref_mut();

        enqueue_assignment(ctx.borrow(), lits![1][0], Reason::Decision);

        let conflict = propagate(ctx.borrow()).unwrap_err();

        let conflict_lits = ctx.part(ClauseAllocP).clause(conflict.cref).lits();
        assert!(conflict_lits
            .iter()
            .all(|&lit| ctx.part(AssignmentP).lit_is_false(lit)));
    }

    #[test]
    fn forced_literal_is_in_position_0() {
        let mut ctx = Context::default();
        ctx_with_clauses(
            &mut ctx,
            &cnf_formula![
                1, 2, 3;
            ],
        );

        let mut ctx = ctx.into_partial_ref_mut();

        enqueue_assignment(ctx.borrow(), lits![-1][0], Reason::Decision);
        enqueue_assignment(ctx.borrow(), lits![-3][0], Reason::Decision);

        assert!(propagate(ctx.borrow()).is_ok());
        assert!(ctx.part(AssignmentP).lit_is_true(lits![2][0]));

        let cref = ctx.part(ClauseDbP).clauses()[0];
        assert_eq!(ctx.part(ClauseAllocP).clause(cref).lits()[0], lits![2][0]);
    }
}
