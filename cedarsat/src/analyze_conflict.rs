//! First-UIP conflict analysis.
use std::mem::swap;

use partial_ref::{partial, split_borrow, PartialRef};

use crate::context::{AnalyzeConflictP, ClauseAllocP, Context, ImplGraphP, TrailP};
use crate::lit::{Lit, Var};
use crate::prop::Conflict;

/// Scratch state for conflict analysis, reused between conflicts.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// Holds the finished learned clause once `analyze_conflict` returns.
    clause: Vec<Lit>,
    /// How many conflict-level literals the clause under construction still contains.
    current_level_count: usize,
    /// Per-variable membership flag for the clause under construction.
    var_flags: Vec<bool>,
    /// Which `var_flags` entries are set and need resetting afterwards.
    to_clean: Vec<Var>,
}

impl AnalyzeConflict {
    /// Grow the per-variable flags to the given variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
    }

    /// The learned clause.
    ///
    /// The asserting literal is in position 0. The remaining literal of the highest decision
    /// level is in position 1, so watching positions 0 and 1 keeps the watch invariant intact
    /// directly after backtracking.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }
}

/// Derive a learned clause and a backjump level from a conflict.
///
/// The conflict clause is repeatedly resolved with the reason of the most recently assigned of
/// its literals, walking the trail in reverse, until a single literal of the conflict decision
/// level remains: the first unique implication point. The negation of that literal is the
/// asserting literal of the learned clause.
///
/// Returns the lowest decision level that makes the learned clause asserting. When the conflict
/// arose without any decisions the learned clause is empty and the formula unsatisfiable.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        ClauseAllocP,
        ImplGraphP,
        TrailP,
    ),
    conflict: Conflict,
) -> usize {
    split_borrow!(lit_ctx = &(ClauseAllocP) ctx);

    {
        let analyze = ctx.part_mut(AnalyzeConflictP);

        analyze.clause.clear();
        analyze.current_level_count = 0;
    }

    if ctx.part(TrailP).current_level() == 0 {
        // A conflict without any decision left to undo; the learned clause stays empty
        return 0;
    }

    // The conflicting clause seeds the clause under construction
    for &lit in conflict.lits(&lit_ctx) {
        add_literal(ctx.borrow(), lit);
    }

    // Resolution steps replace conflict-level literals by their reasons, most recently assigned
    // first, which is exactly the order the trail gives us when walked backwards.

    split_borrow!(trail_ctx = &(TrailP) ctx);

    for &lit in trail_ctx.part(TrailP).trail().iter().rev() {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        let lit_present = &mut analyze.var_flags[lit.index()];
        if *lit_present {
            *lit_present = false;
            analyze.current_level_count -= 1;
            if analyze.current_level_count == 0 {
                // Only one conflict-level literal left: this is the first UIP, and the clause
                // asserts its negation, which goes to position 0
                analyze.clause.push(!lit);
                let end = analyze.clause.len() - 1;
                analyze.clause.swap(0, end);

                break;
            } else {
                // Resolve the literal away against its reason clause
                let (graph, mut ctx) = ctx.split_part(ImplGraphP);

                let reason = graph.reason(lit.var());
                debug_assert!(!reason.is_decision());

                for &reason_lit in reason.lits(&lit_ctx) {
                    add_literal(ctx.borrow(), reason_lit);
                }
            }
        }
    }

    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);

    for var in analyze.to_clean.drain(..) {
        analyze.var_flags[var.index()] = false;
    }

    // Position 1 gets the remaining literal of the highest decision level. Watching positions 0
    // and 1 is then valid as soon as the backjump to that level completes.
    let mut backtrack_to = 0;

    if analyze.clause.len() > 1 {
        let (prefix, rest) = analyze.clause.split_at_mut(2);
        let lit_1 = &mut prefix[1];
        backtrack_to = ctx.part(ImplGraphP).level(lit_1.var());
        for lit in rest.iter_mut() {
            let lit_level = ctx.part(ImplGraphP).level(lit.var());
            if lit_level > backtrack_to {
                backtrack_to = lit_level;
                swap(lit_1, lit);
            }
        }
    }

    backtrack_to
}

/// Add a literal to the clause under construction.
fn add_literal(
    mut ctx: partial!(Context, mut AnalyzeConflictP, ImplGraphP, TrailP),
    lit: Lit,
) {
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let lit_level = ctx.part(ImplGraphP).level(lit.var());
    // Literals falsified at the root level drop out of the resolvent; duplicates are skipped
    if lit_level > 0 && !analyze.var_flags[lit.index()] {
        analyze.var_flags[lit.index()] = true;
        if lit_level == ctx.part(TrailP).current_level() {
            analyze.current_level_count += 1;
        } else {
            analyze.clause.push(lit);
            analyze.to_clean.push(lit.var());
        }
    }
}
