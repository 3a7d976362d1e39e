use std::collections::HashSet;

use cedarsat::dimacs::DimacsParser;
use cedarsat::lit::Lit;
use cedarsat::Solver;

macro_rules! test_cnf {
    ($name:ident, $result:expr) => {
        #[test]
        fn $name() {
            let cnf = include_bytes!(concat!("cnfs/", stringify!($name), ".cnf"));
            let mut solver = Solver::new();
            let formula = DimacsParser::parse(&cnf[..]).expect("parsing failed");
            solver.add_formula(&formula);
            let result = $result;
            assert_eq!(solver.solve(), Some(result));
            if result {
                let model: HashSet<Lit> = solver.model().unwrap().into_iter().collect();
                for clause in formula.iter() {
                    assert!(clause.iter().any(|lit| model.contains(lit)));
                }
            }
        }
    };
}

test_cnf!(unit_chain_sat, true);
test_cnf!(mixed_sat, true);
test_cnf!(xor_pairs_unsat, false);
test_cnf!(php_3_2_unsat, false);

#[test]
fn php_3_2_unsat_requires_learning() {
    let cnf = include_bytes!("cnfs/php_3_2_unsat.cnf");
    let mut solver = Solver::new();
    let formula = DimacsParser::parse(&cnf[..]).expect("parsing failed");
    solver.add_formula(&formula);

    assert_eq!(solver.solve(), Some(false));
    assert!(solver.stats().learnt_clauses >= 1);
}
