//! Variable values, the trail and backjumping.
use partial_ref::{partial, PartialRef};

use cedarsat_formula::lit::LitIdx;

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP};
use crate::lit::{Lit, Var};

use super::Reason;

/// The values currently assigned to the variables, `None` for unassigned ones.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Grow the value table to the given variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// The per-variable values as a slice indexed by variable index.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// The value of a literal, i.e. its variable's value with the literal's polarity applied.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|value| value ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.assignment[lit.index()].is_none()
    }

    /// Whether every variable is assigned.
    pub fn all_assigned(&self) -> bool {
        self.assignment.iter().all(|value| value.is_some())
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    pub fn unassign_var(&mut self, var: Var) {
        self.assignment[var.index()] = None;
    }
}

/// The assignment history: every current assignment, in the order it was made.
///
/// The suffix past `queue_head_pos` doubles as the propagation queue, so the queue discipline is
/// first-in first-out and backtracking automatically discards queued entries.
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    /// Index of the first trail entry that has not been propagated yet.
    queue_head_pos: usize,
    /// Trail length at the start of each decision level.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// The oldest assignment that still awaits propagation.
    pub fn queue_head(&self) -> Option<Lit> {
        self.trail.get(self.queue_head_pos).cloned()
    }

    /// Take the oldest unpropagated assignment out of the queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let head = self.queue_head();
        if head.is_some() {
            self.queue_head_pos += 1;
        }
        head
    }

    /// All current assignments, oldest first.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Open a new decision level; the decision itself is enqueued separately.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    ///
    /// Level 0 is the root level without any decisions.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// Trail index of the first assignment of the given decision level.
    pub fn level_start(&self, level: usize) -> usize {
        if level == 0 {
            0
        } else {
            self.decisions[level - 1] as usize
        }
    }

    /// Whether the propagation queue is empty.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head_pos == self.trail.len()
    }
}

/// Make a currently unassigned literal true and queue it for propagation.
///
/// Records the assignment, its reason and its decision level; the actual propagation happens
/// when the queue is drained.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    trail.trail.push(lit);

    ctx.part_mut(ImplGraphP)
        .assign(lit.var(), reason, trail.decisions.len());
}

/// Unassign every variable above the given decision level and make it the current level.
///
/// The queue of unpropagated assignments is rewound along with the trail, so propagation resumes
/// with the first assignment made after backtracking.
pub fn backtrack(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), level: usize) {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let trail = ctx.part_mut(TrailP);

    if level == trail.decisions.len() {
        return;
    }

    debug_assert!(level < trail.decisions.len());

    let new_trail_len = trail.level_start(level + 1);

    trail.queue_head_pos = new_trail_len;
    trail.decisions.truncate(level);

    for &lit in &trail.trail[new_trail_len..] {
        assignment.unassign_var(lit.var());
    }
    trail.trail.truncate(new_trail_len);
}

/// Throw away all decisions and their consequences, keeping only root-level assignments.
pub fn full_restart(ctx: partial!(Context, mut AssignmentP, mut TrailP)) {
    backtrack(ctx, 0);
}
