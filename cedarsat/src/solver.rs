//! The public solver interface.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::{debug, info};

use cedarsat_dimacs::DimacsParser;

use crate::cdcl::conflict_step;
use crate::cnf::CnfFormula;
use crate::config::SolverConfig;
use crate::context::{
    ensure_var_count, AssignmentP, BranchingP, ClauseDbP, Context, SolverConfigP, SolverStateP,
    StatsP,
};
use crate::lit::{Lit, Var};
use crate::load::load_clause;
use crate::state::SatState;
use crate::stats::Stats;

/// The solver's public face, wrapping a [`Context`] behind a conventional API.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a solver with an empty formula and the default configuration.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Solver {
        let mut solver = Solver::new();
        let seed = config.seed;
        solver.ctx.solver_config = config;
        solver.set_seed(seed);
        solver
    }

    /// Reseed the branching heuristic.
    ///
    /// Two runs on the same formula with the same seed make the same decisions and produce the
    /// same result.
    pub fn set_seed(&mut self, seed: u64) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(SolverConfigP).seed = seed;
        ctx.part_mut(BranchingP).reseed(seed);
    }

    /// Load every clause of the given formula, conjoining it with what is already loaded.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Parse DIMACS CNF input and load it, chunk by chunk.
    ///
    /// Clauses are loaded as each chunk is parsed, so the whole input text never has to sit in
    /// memory at once.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Run the search until the loaded formula is decided.
    ///
    /// Returns `None` when the search was interrupted before it could determine a result, see
    /// [`interrupt_handle`](Solver::interrupt_handle). An interrupted search leaves the solver
    /// in a consistent state; calling `solve` again resumes it.
    pub fn solve(&mut self) -> Option<bool> {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(SolverStateP).interrupted = false;
        debug!(
            "solving formula with {} variables and {} stored clauses",
            ctx.part(AssignmentP).assignment().len(),
            ctx.part(ClauseDbP).count()
        );
        loop {
            let state = ctx.part(SolverStateP);
            if state.sat_state != SatState::Unknown || state.interrupted {
                break;
            }
            conflict_step(ctx.borrow());
        }
        match ctx.part(SolverStateP).sat_state {
            SatState::Unknown => None,
            SatState::Sat => Some(true),
            SatState::Unsat => Some(false),
        }
    }

    /// The satisfying assignment found by the last `solve`, one literal per variable.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            debug_assert!(ctx.part(AssignmentP).all_assigned());
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .flat_map(|(index, assignment)| {
                        assignment.map(|value| Lit::from_var(Var::from_index(index), value))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Counters describing the work performed so far.
    pub fn stats(&self) -> Stats {
        let ctx = self.ctx.into_partial_ref();
        *ctx.part(StatsP)
    }

    /// A handle that asks a running [`solve`](Solver::solve) to stop.
    ///
    /// The handle can be passed to another thread. The search polls the handle at the top of
    /// every search loop iteration and returns `None` from `solve` when an interrupt was
    /// requested. The solver stays in a consistent state and `solve` can be called again.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        let ctx = self.ctx.into_partial_ref();
        InterruptHandle {
            flag: ctx.part(SolverStateP).interrupt_flag().clone(),
        }
    }
}

/// A handle that asks a running [`solve`](Solver::solve) to stop.
#[derive(Clone)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Ask the solver to stop at its next cancellation point.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use cedarsat_dimacs::write_dimacs;
    use cedarsat_formula::{cnf_formula, lits};

    use crate::test::{sat_formula, unsat_cycles_formula};

    #[test]
    fn empty_formula_is_sat() {
        let mut solver = Solver::new();

        assert_eq!(solver.solve(), Some(true));
        assert_eq!(solver.model(), Some(vec![]));
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1, 2;
            ;
        ]);

        assert_eq!(solver.solve(), Some(false));
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn contradicting_unit_clauses_are_unsat() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1;
            -1;
        ]);

        assert_eq!(solver.solve(), Some(false));
    }

    #[test]
    fn unit_clauses_solved_without_decisions() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1;
            -2;
            3;
        ]);

        assert_eq!(solver.solve(), Some(true));
        assert_eq!(solver.model().unwrap(), lits![1, -2, 3]);
        assert_eq!(solver.stats().decisions, 0);
    }

    #[test]
    fn model_is_unique_for_forced_instance() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1, -2;
            2, -3;
            3, -1;
            -1, -2, -3;
        ]);

        assert_eq!(solver.solve(), Some(true));
        assert_eq!(solver.model().unwrap(), lits![-1, -2, -3]);
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let formula = cnf_formula![
            1, 2, 3;
            -1, -2;
            -1, -3;
            -2, -3;
            2, 4, -5;
            -4, 5, 1;
            3, -4;
        ];

        let mut reference_model = None;
        let mut reference_stats: Option<Stats> = None;

        for _ in 0..2 {
            let mut solver = Solver::new();
            solver.set_seed(42);
            solver.add_formula(&formula);

            assert_eq!(solver.solve(), Some(true));

            let model = solver.model().unwrap();
            let stats = solver.stats();

            if let (Some(reference_model), Some(reference_stats)) =
                (&reference_model, &reference_stats)
            {
                assert_eq!(&model, reference_model);
                assert_eq!(stats.learnt_clauses, reference_stats.learnt_clauses);
                assert_eq!(stats.decisions, reference_stats.decisions);
            } else {
                reference_model = Some(model);
                reference_stats = Some(stats);
            }
        }
    }

    #[test]
    fn interrupted_solve_can_be_resumed() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1, 2, 3;
            -1, -2;
            -1, -3;
            -2, -3;
        ]);

        // The pending request is consumed at the first cancellation point.
        solver.interrupt_handle().interrupt();
        assert_eq!(solver.solve(), None);

        assert_eq!(solver.solve(), Some(true));
    }

    proptest! {
        #[test]
        fn contradiction_cycles_unsat(formula in unsat_cycles_formula(1..5usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Some(false));
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0..8usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Some(true));

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0..8usize)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve(), Some(true));

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn solving_twice_with_one_seed_is_reproducible(
            formula in sat_formula(4..15usize, 10..60usize, 0..6usize),
            seed in 0..u64::max_value(),
        ) {
            let mut models = vec![];
            let mut learnt = vec![];

            for _ in 0..2 {
                let mut solver = Solver::new();
                solver.set_seed(seed);
                solver.add_formula(&formula);

                prop_assert_eq!(solver.solve(), Some(true));

                models.push(solver.model().unwrap());
                learnt.push(solver.stats().learnt_clauses);
            }

            prop_assert_eq!(&models[0], &models[1]);
            prop_assert_eq!(learnt[0], learnt[1]);
        }
    }
}
