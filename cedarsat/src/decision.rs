//! Choosing branching literals.
use partial_ref::{partial, PartialRef};

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use crate::config::SolverConfig;
use crate::context::{AssignmentP, BranchingP, Context, ImplGraphP, StatsP, TrailP};
use crate::lit::{Lit, Var};
use crate::prop::{enqueue_assignment, Assignment, Reason};

/// Random branching heuristic.
///
/// Picks a uniformly random unassigned variable and assigns it a uniformly random polarity. The
/// seeded generator makes runs reproducible.
///
/// This is the only place where branching literals are chosen, so a smarter heuristic only needs
/// to replace this type.
pub struct Branching {
    rng: StdRng,
}

impl Default for Branching {
    fn default() -> Branching {
        Branching {
            rng: StdRng::seed_from_u64(SolverConfig::DEFAULT_SEED),
        }
    }
}

impl Branching {
    /// Reset the generator to a deterministic state derived from the given seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Choose a branching literal, or `None` when all variables are assigned.
    fn pick(&mut self, assignment: &Assignment) -> Option<Lit> {
        let var = assignment
            .assignment()
            .iter()
            .enumerate()
            .filter(|(_, value)| value.is_none())
            .map(|(index, _)| Var::from_index(index))
            .choose(&mut self.rng)?;

        Some(var.lit(self.rng.gen()))
    }
}

/// Open a new decision level with a branching literal from the heuristic.
///
/// Returns `false` without deciding anything when every variable already has a value.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut BranchingP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
    ),
) -> bool {
    let (branching, mut ctx) = ctx.split_part_mut(BranchingP);

    match branching.pick(ctx.part(AssignmentP)) {
        Some(decision) => {
            ctx.part_mut(TrailP).new_decision_level();
            ctx.part_mut(StatsP).decisions += 1;

            enqueue_assignment(ctx.borrow(), decision, Reason::Decision);

            true
        }
        None => false,
    }
}
