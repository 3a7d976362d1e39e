//! A conflict driven clause learning SAT solver.
//!
//! Given a formula in conjunctive normal form, the solver either finds a total satisfying
//! assignment of its variables or determines that no such assignment exists.

mod analyze_conflict;
mod cdcl;
mod clause;
mod config;
mod context;
mod decision;
mod load;
mod prop;
mod solver;
mod state;
mod stats;
mod tmp;

#[cfg(test)]
mod test;

pub mod cnf {
    //! CNF formula types, re-exported from [`cedarsat_formula`].
    pub use cedarsat_formula::cnf::CnfFormula;
}

pub mod dimacs {
    //! DIMACS CNF parsing and writing, re-exported from [`cedarsat_dimacs`].
    pub use cedarsat_dimacs::{write_dimacs, DimacsParser, ParserError};
}

pub mod lit {
    //! Literals and variables, re-exported from [`cedarsat_formula`].
    pub use cedarsat_formula::lit::{Lit, Var};
}

pub use config::SolverConfig;
pub use solver::{InterruptHandle, Solver};
pub use stats::Stats;
